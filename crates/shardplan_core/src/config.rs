use std::collections::HashMap;
use std::sync::LazyLock;

use crate::errors::{PlanError, Result};
use crate::types::scalar::ScalarValue;

/// Limit applied at the reduce stage of root relations without an explicit
/// LIMIT.
pub const DEFAULT_SELECT_LIMIT: u64 = 10_000;

/// Configuration for planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub default_select_limit: u64,
    pub verify_plans: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            default_select_limit: DEFAULT_SELECT_LIMIT,
            verify_plans: false,
        }
    }
}

impl PlannerConfig {
    pub fn set_from_scalar(&mut self, name: &str, value: ScalarValue) -> Result<()> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| PlanError::UnknownSetting(name.to_string()))?;

        (func.set)(value, self)
    }

    pub fn get_as_scalar(&self, name: &str) -> Result<ScalarValue> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| PlanError::UnknownSetting(name.to_string()))?;

        Ok((func.get)(self))
    }

    pub fn reset(&mut self, name: &str) -> Result<()> {
        let def_conf = Self::default();

        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| PlanError::UnknownSetting(name.to_string()))?;

        let scalar = (func.get)(&def_conf);
        (func.set)(scalar, self)
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }
}

struct SettingFunctions {
    set: fn(scalar: ScalarValue, conf: &mut PlannerConfig) -> Result<()>,
    get: fn(conf: &PlannerConfig) -> ScalarValue,
}

impl SettingFunctions {
    const fn new<S: PlannerSetting>() -> Self {
        SettingFunctions {
            set: S::set_from_scalar as _,
            get: S::get_as_scalar as _,
        }
    }
}

fn insert_setting<S: PlannerSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<DefaultSelectLimit>(&mut map);
    insert_setting::<VerifyPlans>(&mut map);

    map
});

pub trait PlannerSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_scalar(scalar: ScalarValue, conf: &mut PlannerConfig) -> Result<()>;
    fn get_as_scalar(conf: &PlannerConfig) -> ScalarValue;
}

pub struct DefaultSelectLimit;

impl PlannerSetting for DefaultSelectLimit {
    const NAME: &'static str = "default_select_limit";
    const DESCRIPTION: &'static str =
        "Row limit applied to root relations that don't specify a LIMIT";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut PlannerConfig) -> Result<()> {
        let val = scalar
            .try_as_u64()
            .map_err(|e| PlanError::InvalidSettingValue {
                name: Self::NAME,
                reason: e.to_string(),
            })?;
        if val == 0 {
            return Err(PlanError::InvalidSettingValue {
                name: Self::NAME,
                reason: "limit must be at least 1".to_string(),
            });
        }

        conf.default_select_limit = val;
        Ok(())
    }

    fn get_as_scalar(conf: &PlannerConfig) -> ScalarValue {
        conf.default_select_limit.into()
    }
}

pub struct VerifyPlans;

impl PlannerSetting for VerifyPlans {
    const NAME: &'static str = "verify_plans";
    const DESCRIPTION: &'static str =
        "Check column bookkeeping of every produced plan before returning it";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut PlannerConfig) -> Result<()> {
        match scalar {
            ScalarValue::Boolean(val) => {
                conf.verify_plans = val;
                Ok(())
            }
            other => Err(PlanError::InvalidSettingValue {
                name: Self::NAME,
                reason: format!("expected boolean, got {other}"),
            }),
        }
    }

    fn get_as_scalar(conf: &PlannerConfig) -> ScalarValue {
        conf.verify_plans.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_select_limit() {
        let mut conf = PlannerConfig::default();
        conf.set_from_scalar("default_select_limit", ScalarValue::Int(50))
            .unwrap();

        assert_eq!(50, conf.default_select_limit);
        assert_eq!(
            ScalarValue::UInt(50),
            conf.get_as_scalar("default_select_limit").unwrap()
        );
    }

    #[test]
    fn max_select_limit_accepted() {
        let mut conf = PlannerConfig::default();
        conf.set_from_scalar("default_select_limit", u64::MAX.into())
            .unwrap();

        assert_eq!(u64::MAX, conf.default_select_limit);
    }

    #[test]
    fn zero_select_limit_rejected() {
        let mut conf = PlannerConfig::default();
        let err = conf
            .set_from_scalar("default_select_limit", ScalarValue::Int(0))
            .unwrap_err();

        assert!(matches!(err, PlanError::InvalidSettingValue { .. }));
        assert_eq!(DEFAULT_SELECT_LIMIT, conf.default_select_limit);
    }

    #[test]
    fn unknown_setting() {
        let mut conf = PlannerConfig::default();
        let err = conf
            .set_from_scalar("does_not_exist", ScalarValue::Int(1))
            .unwrap_err();
        assert!(matches!(err, PlanError::UnknownSetting(_)));
    }

    #[test]
    fn reset_single_setting() {
        let mut conf = PlannerConfig::default();
        conf.set_from_scalar("verify_plans", ScalarValue::Boolean(true))
            .unwrap();
        conf.set_from_scalar("default_select_limit", ScalarValue::Int(7))
            .unwrap();

        conf.reset("verify_plans").unwrap();

        assert!(!conf.verify_plans);
        assert_eq!(7, conf.default_select_limit);

        conf.reset_all();
        assert_eq!(PlannerConfig::default(), conf);
    }
}
