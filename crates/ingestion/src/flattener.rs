//! Hoisting nested sub-records into prefixed scalar fields.
//!
//! `{"pair": {"id": "0x1", "reserve0": "5"}}` flattened on `["pair"]`
//! becomes `{"pair_id": "0x1", "pair_reserve0": "5"}`.

use panel_core::{Error, FlatRecord, RawRecord, Result};
use serde_json::Value;

/// Flatten every record on the given nested field names, in order.
///
/// Names are applied one after another, so a later name may refer to an
/// object hoisted by an earlier one (`pair`, then `pair_token0`).
pub fn flatten<I>(records: I, nested: &[&str]) -> Result<Vec<FlatRecord>>
where
    I: IntoIterator<Item = RawRecord>,
{
    records
        .into_iter()
        .map(|record| flatten_record(record, nested))
        .collect()
}

/// Flatten a single record.
///
/// Fails when a declared field is missing or not an object, when a hoisted
/// key collides with an existing one, or when a nested value remains after
/// all declared names were applied.
pub fn flatten_record(mut record: RawRecord, nested: &[&str]) -> Result<FlatRecord> {
    for &name in nested {
        let inner = match record.remove(name) {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                return Err(Error::schema(format!(
                    "record {}: nested field `{name}` is not an object: {other}",
                    describe(&record)
                )))
            }
            None => {
                return Err(Error::schema(format!(
                    "record {}: missing nested field `{name}`",
                    describe(&record)
                )))
            }
        };

        for (key, value) in inner {
            let hoisted = format!("{name}_{key}");
            if record.contains_key(&hoisted) {
                return Err(Error::schema(format!(
                    "record {}: field `{hoisted}` already exists",
                    describe(&record)
                )));
            }
            record.insert(hoisted, value);
        }
    }

    let mut flat = FlatRecord::new();
    for (key, value) in record {
        if value.is_object() || value.is_array() {
            return Err(Error::schema(format!("field `{key}` is still nested")));
        }
        flat.insert(key, value);
    }
    Ok(flat)
}

fn describe(record: &RawRecord) -> String {
    record
        .get("id")
        .and_then(Value::as_str)
        .map(|id| format!("`{id}`"))
        .unwrap_or_else(|| "<no id>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn v2_swap() -> RawRecord {
        raw(json!({
            "id": "0xabc-1",
            "timestamp": "1652054400",
            "amountUSD": "1000",
            "pair": {
                "id": "0xpair",
                "reserve0": "10000",
                "reserve1": "5000",
                "token0": {"id": "0xt0", "name": "Wrapped Ether", "symbol": "WETH"},
                "token1": {"id": "0xt1", "name": "Dai", "symbol": "DAI"}
            },
            "transaction": {"id": "0xabc", "blockNumber": "14740000"}
        }))
    }

    #[test]
    fn test_flatten_two_levels_in_order() {
        let flat = flatten_record(
            v2_swap(),
            &["pair", "pair_token0", "pair_token1", "transaction"],
        )
        .unwrap();

        assert_eq!(flat.text("pair_id").unwrap(), "0xpair");
        assert_eq!(flat.text("pair_token0_symbol").unwrap(), "WETH");
        assert_eq!(flat.text("pair_token1_name").unwrap(), "Dai");
        assert_eq!(flat.text("transaction_blockNumber").unwrap(), "14740000");
        assert!(!flat.contains_key("pair"));
        assert!(!flat.contains_key("pair_token0"));
    }

    #[test]
    fn test_field_count_identity() {
        // top level: id, timestamp, amountUSD, pair, transaction = 5
        // pair: 5 fields, pair_token0: 3, pair_token1: 3, transaction: 2
        // consumed: 4 nested fields
        let input = v2_swap();
        assert_eq!(input.len(), 5);
        let flat = flatten_record(input, &["pair", "pair_token0", "pair_token1", "transaction"])
            .unwrap();
        assert_eq!(flat.len(), 5 + (5 + 3 + 3 + 2) - 4);
    }

    #[test]
    fn test_missing_nested_field() {
        let err = flatten_record(v2_swap(), &["pool"]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(err.to_string().contains("0xabc-1"));
    }

    #[test]
    fn test_nested_field_not_an_object() {
        let mut record = v2_swap();
        record.insert("transaction".into(), Value::Null);
        let err = flatten_record(record, &["pair", "pair_token0", "pair_token1", "transaction"]);
        assert!(matches!(err, Err(Error::Schema(_))));
    }

    #[test]
    fn test_leftover_nested_value_rejected() {
        // pair_token0 is hoisted but never flattened
        let err = flatten_record(v2_swap(), &["pair", "transaction"]);
        assert!(matches!(err, Err(Error::Schema(_))));
    }

    #[test]
    fn test_collision_rejected() {
        let mut record = v2_swap();
        record.insert("transaction_id".into(), json!("dup"));
        let err = flatten_record(record, &["pair", "pair_token0", "pair_token1", "transaction"]);
        assert!(matches!(err, Err(Error::Schema(_))));
    }

    #[test]
    fn test_flatten_batch_fails_on_any_record() {
        let good = v2_swap();
        let mut bad = v2_swap();
        bad.remove("transaction");

        let nested = ["pair", "pair_token0", "pair_token1", "transaction"];
        assert_eq!(flatten(vec![v2_swap(), good], &nested).unwrap().len(), 2);
        assert!(flatten(vec![v2_swap(), bad], &nested).is_err());
    }
}
