//! Global tunables read from environment variables.
//!
//! Parameters that are not worth a configuration field can be declared as
//! statics and flipped from the shell when debugging. A parameter is read at
//! most once, on first access.

use once_cell::sync::OnceCell;
use std::str::FromStr;

pub struct EnvParam<T> {
    env: &'static str,
    default: &'static str,
    value: OnceCell<T>,
}

impl<T> EnvParam<T> {
    pub const fn new(env: &'static str, default: &'static str) -> EnvParam<T> {
        EnvParam {
            env,
            default,
            value: OnceCell::new(),
        }
    }
}

impl<T: FromStr> EnvParam<T> {
    /// Value of the parameter. Unset or unparsable environment variables
    /// fall back to the declared default, which must parse.
    pub fn get(&self) -> T
    where
        T: Copy,
    {
        *self.get_ref()
    }

    pub fn get_ref(&self) -> &T {
        self.value.get_or_init(|| {
            let raw = std::env::var(self.env).unwrap_or_else(|_| self.default.to_string());
            T::from_str(&raw).unwrap_or_else(|_| {
                tracing::warn!(
                    "could not parse value {:?} of {}, using default {:?}",
                    raw,
                    self.env,
                    self.default
                );
                T::from_str(self.default)
                    .unwrap_or_else(|_| panic!("{}: invalid default {:?}", self.env, self.default))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static UNSET: EnvParam<u32> = EnvParam::new("DIVERSE_TEST_UNSET_PARAM", "7");

    #[test]
    fn falls_back_to_default() {
        assert_eq!(UNSET.get(), 7);
    }
}
