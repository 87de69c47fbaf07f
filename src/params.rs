//! Cost parameters and their validation.
//!
//! Every numeric option arrives as a raw command-line token and is checked
//! against the bound table here before anything secret-bearing is allocated.

use std::fmt;

use crate::error::{Error, ParamKind, Result};

/// Largest accepted memory exponent: `2^bits` KiB must stay addressable.
pub const MAX_MEMORY_BITS: u32 = if usize::BITS - 11 < 32 {
    usize::BITS - 11
} else {
    32
};
/// Largest memory cost in KiB.
pub const MAX_MEMORY: u32 = match 1u32.checked_shl(MAX_MEMORY_BITS) {
    Some(max) => max,
    None => u32::MAX,
};
pub const MAX_TIME: u32 = u32::MAX;
pub const MAX_LANES: u32 = 0x00FF_FFFF;
pub const MAX_THREADS: u32 = 0x00FF_FFFF;
/// Upper bound for `-p`; lanes and threads are always equal here.
pub const MAX_PARALLELISM: u32 = if MAX_THREADS < MAX_LANES {
    MAX_THREADS
} else {
    MAX_LANES
};

pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_EXPONENT: u32 = 12; // 4 MiB
pub const DEFAULT_PARALLELISM: u32 = 1;
pub const DEFAULT_OUTPUT_LEN: u32 = 32;

/// Mixing strategy of the key-derivation primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Data-dependent memory access.
    D,
    /// Data-independent memory access.
    #[default]
    I,
}

impl Variant {
    /// Tag written after `$argon2` in the encoded form.
    pub fn tag(&self) -> char {
        match self {
            Variant::D => 'd',
            Variant::I => 'i',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'd' => Some(Variant::D),
            'i' => Some(Variant::I),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::D => f.write_str("Argon2d"),
            Variant::I => f.write_str("Argon2i"),
        }
    }
}

/// Validated inputs to one derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostParameters {
    variant: Variant,
    time_cost: u32,
    memory_cost_kib: u32,
    parallelism: u32,
    output_len: u32,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            variant: Variant::I,
            time_cost: DEFAULT_TIME_COST,
            memory_cost_kib: 1 << DEFAULT_MEMORY_EXPONENT,
            parallelism: DEFAULT_PARALLELISM,
            output_len: DEFAULT_OUTPUT_LEN,
        }
    }
}

impl CostParameters {
    /// Builds parameters from already-numeric values, e.g. fields decoded from
    /// an encoded hash.
    pub fn new(
        variant: Variant,
        time_cost: u32,
        memory_cost_kib: u32,
        parallelism: u32,
        output_len: u32,
    ) -> Result<Self> {
        let params = Self {
            variant,
            time_cost,
            memory_cost_kib,
            parallelism,
            output_len,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TIME).contains(&self.time_cost) {
            return Err(Error::invalid(ParamKind::TimeCost, &self.time_cost.to_string()));
        }
        if !(1..=MAX_MEMORY).contains(&self.memory_cost_kib) {
            return Err(Error::invalid(
                ParamKind::MemoryExponent,
                &self.memory_cost_kib.to_string(),
            ));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(Error::invalid(
                ParamKind::Parallelism,
                &self.parallelism.to_string(),
            ));
        }
        if self.output_len == 0 {
            return Err(Error::invalid(ParamKind::OutputLength, "0"));
        }
        Ok(())
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn memory_cost_kib(&self) -> u32 {
        self.memory_cost_kib
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn lanes(&self) -> u32 {
        self.parallelism
    }

    pub fn output_len(&self) -> u32 {
        self.output_len
    }
}

/// Raw option tokens as they came off the command line.
#[derive(Debug, Clone, Default)]
pub struct ParameterTokens {
    pub data_dependent: bool,
    pub time_cost: Option<String>,
    pub memory_exponent: Option<String>,
    pub parallelism: Option<String>,
    pub output_len: Option<String>,
}

impl ParameterTokens {
    /// Resolves every token, falling back to defaults for absent ones.
    pub fn validate(&self) -> Result<CostParameters> {
        let mut params = CostParameters::default();

        if self.data_dependent {
            params.variant = Variant::D;
        }
        if let Some(token) = &self.memory_exponent {
            params.memory_cost_kib = parse_memory_exponent(token)?;
        }
        if let Some(token) = &self.time_cost {
            params.time_cost = parse_time_cost(token)?;
        }
        if let Some(token) = &self.parallelism {
            params.parallelism = parse_parallelism(token)?;
        }
        if let Some(token) = &self.output_len {
            params.output_len = parse_output_len(token)?;
        }

        Ok(params)
    }
}

/// Base-10 unsigned parse; the type's ceiling is treated as overflow.
fn parse_token(kind: ParamKind, token: &str) -> Result<u64> {
    match token.parse::<u64>() {
        Ok(value) if value != u64::MAX => Ok(value),
        _ => Err(Error::invalid(kind, token)),
    }
}

/// Turns a memory exponent `k` into a cost of `2^k` KiB.
pub fn parse_memory_exponent(token: &str) -> Result<u32> {
    let exponent = parse_token(ParamKind::MemoryExponent, token)?;
    if exponent == 0 || exponent > u64::from(MAX_MEMORY_BITS) {
        return Err(Error::invalid(ParamKind::MemoryExponent, token));
    }

    let m_cost = (1u64 << exponent).min(u64::from(u32::MAX));
    if m_cost > u64::from(MAX_MEMORY) {
        return Err(Error::invalid(ParamKind::MemoryExponent, token));
    }
    Ok(m_cost as u32)
}

pub fn parse_time_cost(token: &str) -> Result<u32> {
    let value = parse_token(ParamKind::TimeCost, token)?;
    if value == 0 || value > u64::from(MAX_TIME) {
        return Err(Error::invalid(ParamKind::TimeCost, token));
    }
    Ok(value as u32)
}

pub fn parse_parallelism(token: &str) -> Result<u32> {
    let value = parse_token(ParamKind::Parallelism, token)?;
    if value == 0 || value > u64::from(MAX_PARALLELISM) {
        return Err(Error::invalid(ParamKind::Parallelism, token));
    }
    Ok(value as u32)
}

/// Zero is rejected here; the primitive owns every other length bound.
pub fn parse_output_len(token: &str) -> Result<u32> {
    let value = parse_token(ParamKind::OutputLength, token)?;
    if value == 0 || value > u64::from(u32::MAX) {
        return Err(Error::invalid(ParamKind::OutputLength, token));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(result: Result<u32>, expected: ParamKind) {
        match result {
            Err(Error::InvalidParameter { kind, .. }) => assert_eq!(kind, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let params = ParameterTokens::default().validate().unwrap();
        assert_eq!(params, CostParameters::default());
        assert_eq!(params.variant(), Variant::I);
        assert_eq!(params.time_cost(), 3);
        assert_eq!(params.memory_cost_kib(), 4096);
        assert_eq!(params.parallelism(), 1);
        assert_eq!(params.output_len(), 32);
    }

    #[test]
    fn memory_exponent_bounds() {
        assert_invalid(parse_memory_exponent("0"), ParamKind::MemoryExponent);
        assert_invalid(
            parse_memory_exponent(&(MAX_MEMORY_BITS + 1).to_string()),
            ParamKind::MemoryExponent,
        );
        assert_eq!(parse_memory_exponent("1").unwrap(), 2);
        assert_eq!(parse_memory_exponent("12").unwrap(), 4096);
    }

    #[test]
    fn memory_exponent_at_max_is_clamped() {
        let m_cost = parse_memory_exponent(&MAX_MEMORY_BITS.to_string()).unwrap();
        assert_eq!(m_cost, MAX_MEMORY);
    }

    #[test]
    fn parallelism_bounds() {
        assert_invalid(parse_parallelism("0"), ParamKind::Parallelism);
        assert_eq!(
            parse_parallelism(&MAX_PARALLELISM.to_string()).unwrap(),
            MAX_PARALLELISM
        );
        assert_invalid(
            parse_parallelism(&(MAX_PARALLELISM + 1).to_string()),
            ParamKind::Parallelism,
        );
    }

    #[test]
    fn time_cost_bounds() {
        assert_invalid(parse_time_cost("0"), ParamKind::TimeCost);
        assert_eq!(parse_time_cost("1").unwrap(), 1);
        assert_eq!(parse_time_cost(&MAX_TIME.to_string()).unwrap(), MAX_TIME);
        assert_invalid(
            parse_time_cost(&(u64::from(MAX_TIME) + 1).to_string()),
            ParamKind::TimeCost,
        );
    }

    #[test]
    fn output_len_rejects_zero_and_garbage() {
        assert_invalid(parse_output_len("0"), ParamKind::OutputLength);
        assert_invalid(parse_output_len(""), ParamKind::OutputLength);
        assert_invalid(parse_output_len("32 bytes"), ParamKind::OutputLength);
        assert_eq!(parse_output_len("1").unwrap(), 1);
        assert_eq!(parse_output_len("64").unwrap(), 64);
    }

    #[test]
    fn non_numeric_and_overflowing_tokens_fail() {
        assert_invalid(parse_time_cost("three"), ParamKind::TimeCost);
        assert_invalid(parse_time_cost("-1"), ParamKind::TimeCost);
        assert_invalid(
            parse_time_cost(&u64::MAX.to_string()),
            ParamKind::TimeCost,
        );
        assert_invalid(
            parse_memory_exponent("18446744073709551616"),
            ParamKind::MemoryExponent,
        );
    }

    #[test]
    fn tokens_override_defaults() {
        let tokens = ParameterTokens {
            data_dependent: true,
            time_cost: Some("2".into()),
            memory_exponent: Some("16".into()),
            parallelism: Some("4".into()),
            output_len: Some("16".into()),
        };
        let params = tokens.validate().unwrap();
        assert_eq!(params.variant(), Variant::D);
        assert_eq!(params.time_cost(), 2);
        assert_eq!(params.memory_cost_kib(), 65536);
        assert_eq!(params.parallelism(), 4);
        assert_eq!(params.lanes(), 4);
        assert_eq!(params.output_len(), 16);
    }

    #[test]
    fn first_bad_token_is_reported() {
        let tokens = ParameterTokens {
            time_cost: Some("0".into()),
            ..ParameterTokens::default()
        };
        match tokens.validate() {
            Err(Error::InvalidParameter { kind, token }) => {
                assert_eq!(kind, ParamKind::TimeCost);
                assert_eq!(token, "0");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn new_rejects_out_of_range_values() {
        assert!(CostParameters::new(Variant::I, 0, 4096, 1, 32).is_err());
        assert!(CostParameters::new(Variant::I, 3, 0, 1, 32).is_err());
        assert!(CostParameters::new(Variant::I, 3, 4096, 0, 32).is_err());
        assert!(CostParameters::new(Variant::I, 3, 4096, MAX_PARALLELISM + 1, 32).is_err());
        assert!(CostParameters::new(Variant::I, 3, 4096, 1, 0).is_err());
        assert!(CostParameters::new(Variant::D, 3, 4096, 1, 32).is_ok());
    }

    #[test]
    fn variant_tags() {
        assert_eq!(Variant::from_tag('i'), Some(Variant::I));
        assert_eq!(Variant::from_tag('d'), Some(Variant::D));
        assert_eq!(Variant::from_tag('x'), None);
        assert_eq!(Variant::D.to_string(), "Argon2d");
    }
}
