// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! The "no value" sentinels.

Slurm fills integer fields that have no meaningful value with a reserved
bit pattern near the top of the field's range. The pattern depends on the
width of the field, so each width has its own constant.

 */

use slurm_sys;


/// The sentinel used in 32-bit fields.
pub const NO_VAL: u32 = slurm_sys::SLURMRS_NO_VAL as u32;

/// The sentinel used in 64-bit fields. Only available if the installed Slurm
/// headers define it.
#[cfg(slurm_api_no_val64)]
pub const NO_VAL64: u64 = slurm_sys::SLURMRS_NO_VAL64 as u64;


/// An integer type that Slurm can fill with a "no value" sentinel.
pub trait Sentinel: Copy + Eq {
    /// The value that Slurm uses to mean "nothing here".
    const NO_VALUE: Self;

    fn is_no_value(self) -> bool {
        self == Self::NO_VALUE
    }

    /// Convert a raw field value into an `Option`.
    fn to_option(self) -> Option<Self> {
        if self.is_no_value() {
            None
        } else {
            Some(self)
        }
    }

    /// Convert an `Option` into a raw field value suitable for handing to Slurm.
    fn from_option(value: Option<Self>) -> Self {
        value.unwrap_or(Self::NO_VALUE)
    }
}

impl Sentinel for u32 {
    const NO_VALUE: u32 = NO_VAL;
}

#[cfg(slurm_api_no_val64)]
impl Sentinel for u64 {
    const NO_VALUE: u64 = NO_VAL64;
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn no_val_keeps_header_value_and_width() {
        assert_eq!(NO_VAL as u64, slurm_sys::NO_VAL as u64);
        assert_eq!(mem::size_of_val(&NO_VAL), 4);
    }

    #[cfg(slurm_api_no_val64)]
    #[test]
    fn no_val64_keeps_header_value_and_width() {
        assert_eq!(NO_VAL64, slurm_sys::NO_VAL64 as u64);
        assert_eq!(mem::size_of_val(&NO_VAL64), 8);
        assert_eq!(mem::size_of_val(&NO_VAL), 4);
        assert_ne!(NO_VAL64, NO_VAL as u64);
    }

    #[test]
    fn u32_option_conversions() {
        assert!(NO_VAL.is_no_value());
        assert_eq!(NO_VAL.to_option(), None);
        assert_eq!(17u32.to_option(), Some(17));
        assert_eq!(u32::from_option(None), NO_VAL);
        assert_eq!(u32::from_option(Some(0)), 0);
    }

    #[cfg(slurm_api_no_val64)]
    #[test]
    fn u64_option_conversions() {
        assert_eq!(NO_VAL64.to_option(), None);
        // A widened 32-bit sentinel is an ordinary 64-bit value.
        assert_eq!((NO_VAL as u64).to_option(), Some(NO_VAL as u64));
        assert_eq!(u64::from_option(None), NO_VAL64);
    }
}
