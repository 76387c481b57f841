//! Flag values to and from their YAML form.
//!
//! | Kind    | Written as                    | Accepted on load                 |
//! |---------|-------------------------------|----------------------------------|
//! | state   | `allow` / `deny`              | any case                         |
//! | boolean | `true` / `false`              | YAML booleans only               |
//! | integer | integer                       | integers, floats truncated       |
//! | double  | float                         | floats and integers              |
//! | string  | string                        | strings only                     |
//! | group   | `all`, `owners`, `nonowners`, ... | also `non_owners`, `non-owners` |

use std::collections::BTreeMap;

use bastion_core::{FlagCatalog, FlagId, FlagKind, FlagValue, RegionGroup, RegionId, State};
use serde_yaml::{Mapping, Number, Value};
use tracing::warn;

/// Encode one value.
pub fn marshal_value(value: &FlagValue) -> Value {
    match value {
        FlagValue::State(state) => Value::String(state.as_str().to_owned()),
        FlagValue::Boolean(b) => Value::Bool(*b),
        FlagValue::Integer(i) => Value::Number(Number::from(*i)),
        FlagValue::Double(d) => Value::Number(Number::from(*d)),
        FlagValue::String(s) => Value::String(s.clone()),
        FlagValue::Group(group) => Value::String(group.as_str().to_owned()),
    }
}

/// Decode one value of the given kind. `None` if it does not parse.
pub fn unmarshal_value(kind: FlagKind, raw: &Value) -> Option<FlagValue> {
    match kind {
        FlagKind::State => raw.as_str().and_then(State::parse).map(FlagValue::State),
        FlagKind::Boolean => raw.as_bool().map(FlagValue::Boolean),
        FlagKind::Integer => match raw.as_i64() {
            Some(i) => Some(FlagValue::Integer(i)),
            None => raw
                .as_f64()
                .filter(|d| d.is_finite() && d.abs() < i64::MAX as f64)
                .map(|d| FlagValue::Integer(d.trunc() as i64)),
        },
        FlagKind::Double => raw.as_f64().map(FlagValue::Double),
        FlagKind::String => raw.as_str().map(|s| FlagValue::String(s.to_owned())),
        FlagKind::Group => raw
            .as_str()
            .and_then(RegionGroup::parse)
            .map(FlagValue::Group),
    }
}

/// Encode a region's flags, keyed by catalog name and sorted by name.
pub fn marshal(catalog: &FlagCatalog, flags: &BTreeMap<FlagId, FlagValue>) -> Mapping {
    let mut named: Vec<(&str, Value)> = Vec::with_capacity(flags.len());
    for (&flag, value) in flags {
        match catalog.get(flag) {
            Some(def) => named.push((def.name.as_str(), marshal_value(value))),
            None => warn!(%flag, "not saving value of unregistered flag"),
        }
    }
    named.sort_unstable_by(|a, b| a.0.cmp(b.0));
    named
        .into_iter()
        .map(|(name, value)| (Value::String(name.to_owned()), value))
        .collect()
}

/// Decode a region's flags. Unknown names and values that do not parse
/// are dropped with a warning.
pub fn unmarshal(catalog: &FlagCatalog, region: &RegionId, raw: &Mapping) -> BTreeMap<FlagId, FlagValue> {
    let mut out = BTreeMap::new();
    for (key, value) in raw {
        let Some(name) = key.as_str() else {
            warn!(%region, ?key, "ignoring flag with a non-string name");
            continue;
        };
        let Some(flag) = catalog.by_name(name) else {
            warn!(%region, flag = name, "ignoring unknown flag");
            continue;
        };
        let Some(def) = catalog.get(flag) else {
            continue;
        };
        match unmarshal_value(def.kind, value) {
            Some(parsed) => {
                out.insert(flag, parsed);
            }
            None => warn!(%region, flag = name, ?value, "ignoring flag value that does not parse"),
        }
    }
    out
}
