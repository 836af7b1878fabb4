use crate::client::{Client, UNKNOWN_AGENT, UNKNOWN_CLIENT};
use crate::error::{ImportError, RowError};
use crate::ids::IdSequence;
use crate::import::parser::{CsvParser, RawRow};
use crate::import::spec::{
    Bound, DateFormats, ImportSpec, NumberKind, AGENT_SPEC, DEPOSIT_SPEC, ORDER_SPEC,
    WITHDRAWAL_SPEC,
};
use crate::import::validator::{parse_date, parse_number, validate_row, ColumnIndex, RowContext, Value};
use crate::record::{EntityKind, PaymentMode, ValidatedRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn clients() -> HashMap<String, Client> {
    let mut clients = HashMap::new();
    clients.insert("S1".to_string(), Client::new("S1", "Corner Shop", "Dana"));
    clients
}

/// Validates the single data row of `csv` against `spec`.
fn validate(spec: &ImportSpec, csv: &str) -> Result<ValidatedRecord, RowError> {
    let parsed = CsvParser::new().parse(csv).unwrap();
    let columns = ColumnIndex::resolve(spec, &parsed).unwrap();
    let clients = clients();
    let ctx = RowContext {
        clients: &clients,
        today: today(),
    };
    let mut ids = IdSequence::starting_after(spec.kind, None);

    validate_row(spec, &columns, &parsed.rows[0], &ctx, &mut ids)
}

#[cfg(test)]
mod column_tests {
    use super::*;

    #[test]
    fn test_all_missing_columns_are_named() {
        let parsed = CsvParser::new().parse("Shop ID,Product\nS1,Soap\n").unwrap();
        let result = ColumnIndex::resolve(&ORDER_SPEC, &parsed);

        match result {
            Err(ImportError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["date", "quantity", "price", "status"]);
            }
            _ => panic!("Expected MissingColumns error"),
        }
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let parsed = CsvParser::new().parse("email,name\nana@example.com,Ana\n").unwrap();
        let columns = ColumnIndex::resolve(&AGENT_SPEC, &parsed).unwrap();

        let row = RawRow {
            line: 2,
            cells: vec!["ana@example.com".to_string(), "Ana".to_string()],
        };
        assert_eq!(columns.cell(&row, 0), "Ana");
        assert_eq!(columns.cell(&row, 1), "ana@example.com");
        assert_eq!(columns.cell(&row, 2), "");
    }

    #[test]
    fn test_columns_may_appear_in_any_order() {
        let record = validate(
            &DEPOSIT_SPEC,
            "payment mode,amount,shop id,date\nbtc,25,S1,2024-03-01\n",
        )
        .unwrap();

        assert_eq!(record.shop_id(), Some("S1"));
        assert_eq!(record.amount(), Some(Decimal::from(25)));
    }
}

#[cfg(test)]
mod number_tests {
    use super::*;

    #[test]
    fn test_decimal_parses() {
        let value = parse_number("amount", "123.45", NumberKind::Decimal, Bound::Positive);
        assert_eq!(value, Ok(Value::Decimal(Decimal::from_str("123.45").unwrap())));
    }

    #[test]
    fn test_not_a_number_is_rejected() {
        let value = parse_number("amount", "abc", NumberKind::Decimal, Bound::Positive);
        assert_eq!(
            value,
            Err(RowError::InvalidNumber {
                column: "amount".to_string(),
                value: "abc".to_string(),
            })
        );
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let value = parse_number("amount", "-5", NumberKind::Decimal, Bound::Positive);
        assert!(matches!(value, Err(RowError::OutOfBounds { .. })));
    }

    #[test]
    fn test_zero_respects_bound() {
        let positive = parse_number("amount", "0", NumberKind::Decimal, Bound::Positive);
        assert!(positive.is_err());

        let non_negative = parse_number("price", "0", NumberKind::Decimal, Bound::NonNegative);
        assert_eq!(non_negative, Ok(Value::Decimal(Decimal::ZERO)));
    }

    #[test]
    fn test_integer_rejects_fractions() {
        let value = parse_number("quantity", "2.5", NumberKind::Integer, Bound::Positive);
        assert!(matches!(value, Err(RowError::InvalidNumber { .. })));

        let value = parse_number("quantity", "4", NumberKind::Integer, Bound::Positive);
        assert_eq!(value, Ok(Value::Integer(4)));
    }

    #[test]
    fn test_digit_separators_are_rejected() {
        let value = parse_number("amount", "1_000", NumberKind::Decimal, Bound::Positive);
        assert_eq!(
            value,
            Err(RowError::InvalidNumber {
                column: "amount".to_string(),
                value: "1_000".to_string(),
            })
        );

        let value = parse_number("quantity", "1_0", NumberKind::Integer, Bound::Positive);
        assert!(matches!(value, Err(RowError::InvalidNumber { .. })));
    }

    #[test]
    fn test_negative_price_never_produces_a_record() {
        let result = validate(
            &ORDER_SPEC,
            "shop id,date,product,quantity,price,status\nS1,2024-01-01,Soap,1,-0.01,Pending\n",
        );
        assert!(matches!(result, Err(RowError::OutOfBounds { .. })));
    }
}

#[cfg(test)]
mod date_tests {
    use super::*;

    #[test]
    fn test_iso_only_accepts_iso() {
        assert_eq!(
            parse_date("2023-01-31", DateFormats::Iso),
            NaiveDate::from_ymd_opt(2023, 1, 31)
        );
        assert_eq!(parse_date("31/01/2023", DateFormats::Iso), None);
    }

    #[test]
    fn test_flexible_layouts() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 31);
        for raw in [
            "2023-01-31",
            "2023/01/31",
            "31/01/2023",
            "01/31/2023",
            "31.01.2023",
            "Jan 31, 2023",
            "31 January 2023",
            "2023-01-31T09:30:00Z",
            "2023-01-31 09:30:00",
        ] {
            assert_eq!(parse_date(raw, DateFormats::Flexible), expected, "{}", raw);
        }
    }

    #[test]
    fn test_short_years_are_not_dates() {
        assert_eq!(parse_date("23-01-31", DateFormats::Iso), None);
        assert_eq!(parse_date("1/2/3", DateFormats::Flexible), None);
        assert_eq!(parse_date("5/3/24", DateFormats::Flexible), None);
        assert_eq!(parse_date("12345-01-31", DateFormats::Iso), None);
    }

    #[test]
    fn test_short_year_order_date_defaults_to_today() {
        let record = validate(
            &ORDER_SPEC,
            "shop id,date,product,quantity,price,status\nS1,05-03-24,Soap,1,2,Pending\n",
        )
        .unwrap();

        assert_eq!(record.date(), Some(today()));
    }

    #[test]
    fn test_short_year_deposit_date_defaults_to_today() {
        let record = validate(
            &DEPOSIT_SPEC,
            "shop id,date,amount,payment mode\nS1,5/3/24,10,Cash\n",
        )
        .unwrap();

        assert_eq!(record.date(), Some(today()));
    }

    #[test]
    fn test_short_year_agent_join_date_is_rejected() {
        let result = validate(&AGENT_SPEC, "name,email,joined\nAna,ana@example.com,1/2/3\n");
        assert!(matches!(result, Err(RowError::InvalidDate { .. })));
    }

    #[test]
    fn test_bad_order_date_defaults_to_today() {
        let record = validate(
            &ORDER_SPEC,
            "shop id,date,product,quantity,price,status\nS1,someday,Soap,2,1.5,Pending\n",
        )
        .unwrap();

        assert_eq!(record.date(), Some(today()));
    }

    #[test]
    fn test_empty_deposit_date_defaults_to_today() {
        let record = validate(
            &DEPOSIT_SPEC,
            "shop id,date,amount,payment mode\nS1,,10,Cash\n",
        )
        .unwrap();

        assert_eq!(record.date(), Some(today()));
    }

    #[test]
    fn test_bad_agent_join_date_is_rejected() {
        let result = validate(&AGENT_SPEC, "name,email,joined\nAna,ana@example.com,soon\n");
        assert_eq!(
            result,
            Err(RowError::InvalidDate {
                column: "joined".to_string(),
                value: "soon".to_string(),
            })
        );
    }
}

#[cfg(test)]
mod reference_tests {
    use super::*;

    #[test]
    fn test_known_shop_fills_client_fields() {
        let record = validate(
            &WITHDRAWAL_SPEC,
            "shop id,date,amount,payment mode,note\nS1,2024-01-05,40,Wire,\"rent, january\"\n",
        )
        .unwrap();

        match record {
            ValidatedRecord::Withdrawal(withdrawal) => {
                assert_eq!(withdrawal.client_name, "Corner Shop");
                assert_eq!(withdrawal.agent, "Dana");
                assert_eq!(withdrawal.payment_mode, PaymentMode::BankTransfer);
                assert_eq!(withdrawal.note.as_deref(), Some("rent, january"));
            }
            other => panic!("Expected withdrawal, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_shop_rejected_for_withdrawals() {
        let result = validate(
            &WITHDRAWAL_SPEC,
            "shop id,date,amount,payment mode\nS7,2024-01-05,40,Cash\n",
        );
        assert_eq!(result, Err(RowError::UnknownShop("S7".to_string())));
    }

    #[test]
    fn test_unknown_shop_gets_placeholder_for_deposits() {
        let record = validate(
            &DEPOSIT_SPEC,
            "shop id,date,amount,payment mode\nS7,2024-01-05,40,Cash\n",
        )
        .unwrap();

        match record {
            ValidatedRecord::Deposit(deposit) => {
                assert_eq!(deposit.shop_id, "S7");
                assert_eq!(deposit.client_name, UNKNOWN_CLIENT);
                assert_eq!(deposit.agent, UNKNOWN_AGENT);
            }
            other => panic!("Expected deposit, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_shop_id_is_missing_value() {
        let result = validate(
            &DEPOSIT_SPEC,
            "shop id,date,amount,payment mode\n,2024-01-05,40,Cash\n",
        );
        assert_eq!(
            result,
            Err(RowError::MissingValue {
                column: "shop id".to_string(),
            })
        );
    }
}

#[cfg(test)]
mod enum_tests {
    use super::*;

    #[test]
    fn test_unknown_payment_mode_is_rejected() {
        let result = validate(
            &DEPOSIT_SPEC,
            "shop id,date,amount,payment mode\nS1,2024-01-05,40,Cheque\n",
        );
        assert_eq!(
            result,
            Err(RowError::UnknownLabel {
                column: "payment mode".to_string(),
                value: "Cheque".to_string(),
            })
        );
    }

    #[test]
    fn test_synonym_and_label_give_same_record() {
        let canonical = validate(
            &DEPOSIT_SPEC,
            "shop id,date,amount,payment mode\nS1,2024-01-05,40,Crypto\n",
        )
        .unwrap();
        let synonym = validate(
            &DEPOSIT_SPEC,
            "shop id,date,amount,payment mode\nS1,2024-01-05,40,bitcoin\n",
        )
        .unwrap();

        assert_eq!(canonical, synonym);
    }

    #[test]
    fn test_unknown_order_status_is_rejected() {
        let result = validate(
            &ORDER_SPEC,
            "shop id,date,product,quantity,price,status\nS1,2024-01-01,Soap,1,2,shipped\n",
        );
        assert!(matches!(result, Err(RowError::UnknownLabel { .. })));
    }
}

#[cfg(test)]
mod agent_tests {
    use super::*;

    #[test]
    fn test_agent_optional_fields() {
        let record = validate(
            &AGENT_SPEC,
            "name,email,phone,region,joined\nAna,ana@example.com,,North,2022-09-01\n",
        )
        .unwrap();

        match record {
            ValidatedRecord::Agent(agent) => {
                assert_eq!(agent.id, "AG00001");
                assert_eq!(agent.phone, None);
                assert_eq!(agent.region.as_deref(), Some("North"));
                assert_eq!(agent.joined, NaiveDate::from_ymd_opt(2022, 9, 1));
            }
            other => panic!("Expected agent, got {:?}", other),
        }
        assert_eq!(ImportSpec::for_kind(EntityKind::Agent).kind, EntityKind::Agent);
    }

    #[test]
    fn test_id_is_not_consumed_by_rejected_rows() {
        let parsed = CsvParser::new()
            .parse("name,email\nAna,\nBo,bo@example.com\n")
            .unwrap();
        let columns = ColumnIndex::resolve(&AGENT_SPEC, &parsed).unwrap();
        let clients = HashMap::new();
        let ctx = RowContext {
            clients: &clients,
            today: today(),
        };
        let mut ids = IdSequence::starting_after(EntityKind::Agent, None);

        assert!(validate_row(&AGENT_SPEC, &columns, &parsed.rows[0], &ctx, &mut ids).is_err());
        let record = validate_row(&AGENT_SPEC, &columns, &parsed.rows[1], &ctx, &mut ids).unwrap();
        assert_eq!(record.id(), "AG00001");
    }
}
