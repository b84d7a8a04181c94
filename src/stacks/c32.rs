// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! c32check address encoding.
//!
//! A Stacks address is `S` + the c32 digit of the version byte + the c32
//! encoding of `hash160 ++ checksum`, where the checksum is the first four
//! bytes of `sha256(sha256(version ++ hash160))`.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Errors produced while parsing a c32check address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 'S'")]
    MissingPrefix,

    #[error("address is too short")]
    TooShort,

    #[error("invalid c32 character '{0}'")]
    InvalidCharacter(char),

    #[error("expected a 20-byte hash, got {0} bytes")]
    InvalidLength(usize),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("version {0} does not fit in 5 bits")]
    InvalidVersion(u8),
}

/// A decoded Stacks address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StacksAddress {
    pub version: u8,
    pub hash160: [u8; 20],
}

impl StacksAddress {
    pub fn new(version: u8, hash160: [u8; 20]) -> Result<Self, AddressError> {
        if version >= 32 {
            return Err(AddressError::InvalidVersion(version));
        }
        Ok(Self { version, hash160 })
    }
}

impl fmt::Display for StacksAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = self.hash160.to_vec();
        payload.extend_from_slice(&checksum(self.version, &self.hash160));
        write!(
            f,
            "S{}{}",
            ALPHABET[usize::from(self.version & 0x1f)] as char,
            encode(&payload)
        )
    }
}

impl FromStr for StacksAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix('S').ok_or(AddressError::MissingPrefix)?;
        let mut chars = rest.chars();
        let version_char = chars.next().ok_or(AddressError::TooShort)?;
        let version = digit_value(version_char)?;

        let decoded = decode(chars.as_str())?;
        if decoded.len() < 4 {
            return Err(AddressError::TooShort);
        }
        let (hash, check) = decoded.split_at(decoded.len() - 4);
        let hash160: [u8; 20] = hash
            .try_into()
            .map_err(|_| AddressError::InvalidLength(hash.len()))?;

        if checksum(version, &hash160) != check {
            return Err(AddressError::ChecksumMismatch);
        }

        Ok(Self { version, hash160 })
    }
}

fn checksum(version: u8, hash160: &[u8; 20]) -> [u8; 4] {
    let mut hasher = Sha256::new();
    hasher.update([version]);
    hasher.update(hash160);
    let first = hasher.finalize();
    let second = Sha256::digest(first);
    [second[0], second[1], second[2], second[3]]
}

fn digit_value(c: char) -> Result<u8, AddressError> {
    let normalized = match c.to_ascii_uppercase() {
        'O' => '0',
        'L' | 'I' => '1',
        other => other,
    };
    ALPHABET
        .iter()
        .position(|&a| a as char == normalized)
        .map(|p| p as u8)
        .ok_or(AddressError::InvalidCharacter(c))
}

/// c32-encode bytes. Each leading zero byte becomes a leading `0` digit.
pub fn encode(data: &[u8]) -> String {
    let mut digits = Vec::with_capacity(data.len() * 8 / 5 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &byte in data.iter().rev() {
        acc |= u32::from(byte) << bits;
        bits += 8;
        while bits >= 5 {
            digits.push(ALPHABET[(acc & 0x1f) as usize]);
            acc >>= 5;
            bits -= 5;
        }
    }
    if bits > 0 {
        digits.push(ALPHABET[(acc & 0x1f) as usize]);
    }

    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    let leading_zero_bytes = data.iter().take_while(|&&b| b == 0).count();
    digits.extend(std::iter::repeat_n(b'0', leading_zero_bytes));
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// c32-decode a digit string. Each leading `0` digit becomes a zero byte.
pub fn decode(input: &str) -> Result<Vec<u8>, AddressError> {
    let values = input
        .chars()
        .map(digit_value)
        .collect::<Result<Vec<u8>, _>>()?;

    let mut bytes = Vec::with_capacity(values.len() * 5 / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &value in values.iter().rev() {
        acc |= u32::from(value) << bits;
        bits += 5;
        while bits >= 8 {
            bytes.push((acc & 0xff) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 && acc != 0 {
        bytes.push((acc & 0xff) as u8);
    }

    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    let leading_zero_digits = values.iter().take_while(|&&v| v == 0).count();
    bytes.extend(std::iter::repeat_n(0u8, leading_zero_digits));
    bytes.reverse();

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY_DEPLOYER: &str = "ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNJ";

    #[test]
    fn parses_registry_deployer() {
        let address: StacksAddress = REGISTRY_DEPLOYER.parse().unwrap();
        assert_eq!(address.version, 26);
        assert_eq!(
            hex::encode(address.hash160),
            "e3fcdc6edfb6f574d3c0c073e4c97d7f1583bca5"
        );
        assert_eq!(address.to_string(), REGISTRY_DEPLOYER);
    }

    #[test]
    fn encodes_zero_hash_boot_addresses() {
        let mainnet = StacksAddress::new(22, [0; 20]).unwrap();
        let testnet = StacksAddress::new(26, [0; 20]).unwrap();
        assert_eq!(mainnet.to_string(), "SP000000000000000000002Q6VF78");
        assert_eq!(testnet.to_string(), "ST000000000000000000002AMW42H");
    }

    #[test]
    fn rejects_bad_checksum() {
        let tampered = "ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNK";
        assert_eq!(
            tampered.parse::<StacksAddress>(),
            Err(AddressError::ChecksumMismatch)
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            "XT3HZSQ3".parse::<StacksAddress>(),
            Err(AddressError::MissingPrefix)
        );
        assert_eq!(
            "ST3HZ!Q3".parse::<StacksAddress>(),
            Err(AddressError::InvalidCharacter('!'))
        );
        assert_eq!("S".parse::<StacksAddress>(), Err(AddressError::TooShort));
    }

    #[test]
    fn lowercase_input_is_accepted() {
        let address: StacksAddress = REGISTRY_DEPLOYER.to_lowercase().parse().unwrap();
        assert_eq!(address.to_string(), REGISTRY_DEPLOYER);
    }
}
