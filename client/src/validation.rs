//! Field rules for outbound requests. Every rule runs; all failures are
//! reported together.

use crate::error::FieldError;
use crate::payloads::{BeneficiaryRecord, PaymentDetails};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,13}(\.\d{1,2})?$").expect("static regex"));
static MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("static regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$").expect("static regex"));

pub const PAYMODES: &[&str] = &["RT", "NE", "PA", "FT", "CC", "DD"];
pub const TXN_TYPES: &[&str] = &["CUST", "MERC", "DIST", "INTN", "VEND"];
pub const ACCOUNT_TYPES: &[&str] = &["SB", "CA", "CC", "OD"];

/// Accumulates field errors. Empty strings count as absent.
#[derive(Debug, Default)]
pub struct Rules {
    prefix: String,
    errors: Vec<FieldError>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field names reported as `prefix.field`
    pub fn nested(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            errors: Vec::new(),
        }
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        let name = if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{field}", self.prefix)
        };
        self.errors.push(FieldError::new(name, message));
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
        self
    }

    pub fn exact_len(&mut self, field: &str, value: &str, len: usize) -> &mut Self {
        if !value.is_empty() && value.chars().count() != len {
            self.push(field, format!("must be exactly {len} characters"));
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !value.is_empty() && !allowed.contains(&value) {
            self.push(field, format!("must be one of {}", allowed.join(", ")));
        }
        self
    }

    pub fn amount(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !AMOUNT.is_match(value) {
            self.push(field, "must be a decimal amount with at most 2 fraction digits");
        }
        self
    }

    pub fn date(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
            self.push(field, "must be a date in YYYY-MM-DD format");
        }
        self
    }

    pub fn mobile(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !MOBILE.is_match(value) {
            self.push(field, "must be exactly 10 digits");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if !value.is_empty() && !EMAIL.is_match(value) {
            self.push(field, "must be a valid email address");
        }
        self.max_len(field, value, max)
    }

    pub fn absorb(&mut self, other: Rules) -> &mut Self {
        self.errors.extend(other.errors);
        self
    }

    pub fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

pub fn payment_details(details: &PaymentDetails, rules: &mut Rules) {
    let mode = details.txn_paymode.as_str();

    rules
        .required("txnPaymode", mode)
        .one_of("txnPaymode", mode, PAYMODES)
        .required("custUniqRef", &details.cust_uniq_ref)
        .max_len("custUniqRef", &details.cust_uniq_ref, 30)
        .one_of("txnType", &details.txn_type, TXN_TYPES)
        .required("txnAmount", &details.txn_amount)
        .amount("txnAmount", &details.txn_amount)
        .max_len("corpAccNum", &details.corp_acc_num, 30)
        .required("beneCode", &details.bene_code)
        .max_len("beneCode", &details.bene_code, 30)
        .required("beneName", &details.bene_name)
        .max_len("beneName", &details.bene_name, 70)
        .required("valueDate", &details.value_date)
        .date("valueDate", &details.value_date)
        .max_len("beneAccNum", &details.bene_acc_num, 30)
        .max_len("beneLEI", &details.bene_lei, 100)
        .max_len("beneAddr1", &details.bene_addr1, 100)
        .max_len("beneAddr2", &details.bene_addr2, 100)
        .max_len("beneAddr3", &details.bene_addr3, 100)
        .max_len("beneCity", &details.bene_city, 50)
        .max_len("beneState", &details.bene_state, 50)
        .max_len("benePincode", &details.bene_pincode, 10)
        .max_len("beneBankName", &details.bene_bank_name, 70)
        .email("beneEmailAddr1", &details.bene_email_addr1, 250)
        .mobile("beneMobileNo", &details.bene_mobile_no)
        .max_len("productCode", &details.product_code, 20)
        .max_len("senderToReceiverInfo", &details.sender_to_receiver_info, 500)
        .max_len("baseCode", &details.base_code, 30)
        .max_len("chequeNumber", &details.cheque_number, 20)
        .date("chequeDate", &details.cheque_date)
        .max_len("payableLocation", &details.payable_location, 50)
        .max_len("printLocation", &details.print_location, 50);

    if matches!(mode, "RT" | "NE" | "FT") {
        rules.required("beneAccNum", &details.bene_acc_num);
    }
    if matches!(mode, "RT" | "NE") {
        rules
            .required("beneIfscCode", &details.bene_ifsc_code)
            .exact_len("beneIfscCode", &details.bene_ifsc_code, 11);
    }
}

pub fn beneficiary(record: &BeneficiaryRecord, rules: &mut Rules) {
    rules
        .max_len("beneCode", &record.bene_code, 30)
        .required("beneName", &record.bene_name)
        .max_len("beneName", &record.bene_name, 70)
        .required("beneAccNum", &record.bene_acc_num)
        .max_len("beneAccNum", &record.bene_acc_num, 30)
        .required("beneIfscCode", &record.bene_ifsc_code)
        .exact_len("beneIfscCode", &record.bene_ifsc_code, 11)
        .max_len("beneBankName", &record.bene_bank_name, 70)
        .mobile("beneMobileNo", &record.bene_mobile_no)
        .email("beneEmailAddr1", &record.bene_email_addr1, 250)
        .one_of("beneAcType", &record.bene_ac_type, ACCOUNT_TYPES);
}

pub fn crn(crn: &str, rules: &mut Rules) {
    rules.required("crn", crn).max_len("crn", crn, 30);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    fn neft() -> PaymentDetails {
        PaymentDetails {
            txn_paymode: "NE".into(),
            cust_uniq_ref: "REF001".into(),
            txn_type: "CUST".into(),
            txn_amount: "500.00".into(),
            corp_acc_num: "309010100067740".into(),
            bene_code: "ACME01".into(),
            value_date: "2026-01-15".into(),
            bene_name: "Acme Ltd".into(),
            bene_acc_num: "50100012345678".into(),
            bene_ifsc_code: "HDFC0000001".into(),
            ..Default::default()
        }
    }

    fn check(details: &PaymentDetails) -> Vec<FieldError> {
        let mut rules = Rules::new();
        payment_details(details, &mut rules);
        rules.finish()
    }

    #[test]
    fn test_valid_neft() {
        assert!(check(&neft()).is_empty());
    }

    #[test]
    fn test_amount_shapes() {
        for ok in ["1", "1000", "1000.5", "1000.50", "1234567890123.99"] {
            let details = PaymentDetails { txn_amount: ok.into(), ..neft() };
            assert!(check(&details).is_empty(), "{ok}");
        }
        for bad in ["1,000", "10.123", ".5", "-5", "12345678901234", "1e3"] {
            let details = PaymentDetails { txn_amount: bad.into(), ..neft() };
            assert_eq!(fields(&check(&details)), ["txnAmount"], "{bad}");
        }
    }

    #[test]
    fn test_all_errors_collected() {
        let details = PaymentDetails {
            txn_paymode: "XX".into(),
            cust_uniq_ref: "R".repeat(31),
            txn_amount: "abc".into(),
            value_date: "2026-02-30".into(),
            bene_mobile_no: "12345".into(),
            ..neft()
        };
        assert_eq!(
            fields(&check(&details)),
            ["txnPaymode", "custUniqRef", "txnAmount", "valueDate", "beneMobileNo"]
        );
    }

    #[test]
    fn test_ifsc_only_required_for_rtgs_and_neft() {
        let rtgs = PaymentDetails {
            txn_paymode: "RT".into(),
            bene_ifsc_code: "HDFC01".into(),
            ..neft()
        };
        assert_eq!(fields(&check(&rtgs)), ["beneIfscCode"]);

        let internal = PaymentDetails {
            txn_paymode: "FT".into(),
            bene_ifsc_code: String::new(),
            ..neft()
        };
        assert!(check(&internal).is_empty());

        let cheque = PaymentDetails {
            txn_paymode: "CC".into(),
            bene_acc_num: String::new(),
            bene_ifsc_code: String::new(),
            ..neft()
        };
        assert!(check(&cheque).is_empty());

        let no_account = PaymentDetails {
            txn_paymode: "FT".into(),
            bene_acc_num: String::new(),
            ..neft()
        };
        assert_eq!(fields(&check(&no_account)), ["beneAccNum"]);
    }

    #[test]
    fn test_beneficiary_rules() {
        let record = BeneficiaryRecord {
            bene_name: "Acme".into(),
            bene_acc_num: "123".into(),
            bene_ifsc_code: "HDFC0000001".into(),
            bene_ac_type: "CA".into(),
            bene_email_addr1: "ops@acme.example".into(),
            ..Default::default()
        };
        let mut rules = Rules::nested("beneinsert[0]");
        beneficiary(&record, &mut rules);
        assert!(rules.finish().is_empty());

        let bad = BeneficiaryRecord {
            bene_ac_type: "XX".into(),
            bene_email_addr1: "not-an-email".into(),
            ..Default::default()
        };
        let mut rules = Rules::nested("beneinsert[0]");
        beneficiary(&bad, &mut rules);
        assert_eq!(
            fields(&rules.finish()),
            [
                "beneinsert[0].beneName",
                "beneinsert[0].beneAccNum",
                "beneinsert[0].beneIfscCode",
                "beneinsert[0].beneEmailAddr1",
                "beneinsert[0].beneAcType",
            ]
        );
    }

    #[test]
    fn test_crn_rules() {
        let mut rules = Rules::new();
        crn("  ", &mut rules);
        crn(&"C".repeat(31), &mut rules);
        crn("REF001", &mut rules);
        assert_eq!(fields(&rules.finish()), ["crn", "crn"]);
    }
}
