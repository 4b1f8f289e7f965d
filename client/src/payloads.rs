//! Request bodies for each bank endpoint.
//!
//! Field order is the wire order and feeds the checksum, so fields are
//! declared exactly as the bank documents them.

use crate::config::{ClientConfig, Endpoint};
use crate::error::FieldError;
use crate::validation::{self, Rules};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request body bound to one endpoint
pub trait BankRequest: Serialize {
    const ENDPOINT: Endpoint;

    /// Field problems, all of them, in declaration order
    fn validate(&self) -> Vec<FieldError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    pub corp_acc_num: String,
    pub channel_id: String,
    pub corp_code: String,
    pub checksum: String,
}

impl BalanceRequest {
    pub fn new(config: &ClientConfig, corp_acc_num: &str) -> Self {
        Self {
            corp_acc_num: corp_acc_num.trim().to_string(),
            channel_id: config.channel_id.clone(),
            corp_code: config.corp_code.clone(),
            checksum: String::new(),
        }
    }
}

impl BankRequest for BalanceRequest {
    const ENDPOINT: Endpoint = Endpoint::Balance;

    fn validate(&self) -> Vec<FieldError> {
        let mut rules = Rules::new();
        rules
            .required("corpAccNum", &self.corp_acc_num)
            .max_len("corpAccNum", &self.corp_acc_num, 30);
        rules.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryRecord {
    pub api_version: String,
    pub bene_code: String,
    pub bene_name: String,
    pub bene_acc_num: String,
    pub bene_ifsc_code: String,
    pub bene_ac_type: String,
    pub bene_bank_name: String,
    pub bene_email_addr1: String,
    pub bene_mobile_no: String,
    pub checksum: String,
}

impl Default for BeneficiaryRecord {
    fn default() -> Self {
        Self {
            api_version: "1.0".into(),
            bene_code: String::new(),
            bene_name: String::new(),
            bene_acc_num: String::new(),
            bene_ifsc_code: String::new(),
            bene_ac_type: String::new(),
            bene_bank_name: String::new(),
            bene_email_addr1: String::new(),
            bene_mobile_no: String::new(),
            checksum: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryRegistration {
    pub channel_id: String,
    pub corp_code: String,
    pub user_id: String,
    pub beneinsert: Vec<BeneficiaryRecord>,
    pub checksum: String,
}

impl BeneficiaryRegistration {
    /// Records without a beneficiary code get a generated one
    pub fn new(config: &ClientConfig, records: Vec<BeneficiaryRecord>) -> Self {
        let stamp = chrono::Utc::now().timestamp_millis();
        let beneinsert = records
            .into_iter()
            .enumerate()
            .map(|(i, mut record)| {
                if record.bene_code.trim().is_empty() {
                    record.bene_code = format!("BENE{stamp}{i}");
                }
                record
            })
            .collect();

        Self {
            channel_id: config.channel_id.clone(),
            corp_code: config.corp_code.clone(),
            user_id: config.user_id.clone(),
            beneinsert,
            checksum: String::new(),
        }
    }
}

impl BankRequest for BeneficiaryRegistration {
    const ENDPOINT: Endpoint = Endpoint::BeneficiaryRegistration;

    fn validate(&self) -> Vec<FieldError> {
        let mut rules = Rules::new();
        if self.beneinsert.is_empty() {
            rules.required("beneinsert", "");
        }
        for (i, record) in self.beneinsert.iter().enumerate() {
            let mut nested = Rules::nested(format!("beneinsert[{i}]"));
            validation::beneficiary(record, &mut nested);
            rules.absorb(nested);
        }
        rules.finish()
    }
}

/// Filter for a beneficiary lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeneficiaryQuery {
    pub bene_code: Option<String>,
    pub status: Option<String>,
    pub email_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryEnquiry {
    pub channel_id: String,
    pub corp_code: String,
    pub bene_code: String,
    pub status: String,
    pub email_id: String,
    pub checksum: String,
}

impl BeneficiaryEnquiry {
    pub fn new(config: &ClientConfig, query: BeneficiaryQuery) -> Self {
        Self {
            channel_id: config.channel_id.clone(),
            corp_code: config.corp_code.clone(),
            bene_code: query.bene_code.unwrap_or_default(),
            status: query.status.unwrap_or_else(|| "All".to_string()),
            email_id: query.email_id.unwrap_or_default(),
            checksum: String::new(),
        }
    }
}

impl BankRequest for BeneficiaryEnquiry {
    const ENDPOINT: Endpoint = Endpoint::BeneficiaryEnquiry;

    fn validate(&self) -> Vec<FieldError> {
        let mut rules = Rules::new();
        rules
            .max_len("beneCode", &self.bene_code, 30)
            .email("emailId", &self.email_id, 250);
        rules.finish()
    }
}

/// Free-form invoice breakdown; an empty object when unused
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InvoiceDetails(pub Value);

impl Default for InvoiceDetails {
    fn default() -> Self {
        InvoiceDetails(Value::Object(Map::new()))
    }
}

/// One payment instruction. Optional fields are sent as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    pub txn_paymode: String,
    pub cust_uniq_ref: String,
    pub txn_type: String,
    pub txn_amount: String,
    #[serde(rename = "beneLEI")]
    pub bene_lei: String,
    pub corp_acc_num: String,
    pub bene_code: String,
    pub value_date: String,
    pub bene_name: String,
    pub bene_acc_num: String,
    pub bene_ac_type: String,
    pub bene_addr1: String,
    pub bene_addr2: String,
    pub bene_addr3: String,
    pub bene_city: String,
    pub bene_state: String,
    pub bene_pincode: String,
    pub bene_ifsc_code: String,
    pub bene_bank_name: String,
    pub base_code: String,
    pub cheque_number: String,
    pub cheque_date: String,
    pub payable_location: String,
    pub print_location: String,
    pub bene_email_addr1: String,
    pub bene_mobile_no: String,
    pub product_code: String,
    pub invoice_details: InvoiceDetails,
    pub enrichment1: String,
    pub enrichment2: String,
    pub enrichment3: String,
    pub enrichment4: String,
    pub enrichment5: String,
    pub sender_to_receiver_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundTransfer {
    pub channel_id: String,
    pub corp_code: String,
    pub payment_details: PaymentDetails,
    pub checksum: String,
}

impl FundTransfer {
    /// `txnType` defaults to `CUST`
    pub fn new(config: &ClientConfig, mut details: PaymentDetails) -> Self {
        if details.txn_type.trim().is_empty() {
            details.txn_type = "CUST".to_string();
        }
        details.cust_uniq_ref = details.cust_uniq_ref.trim().to_string();

        Self {
            channel_id: config.channel_id.clone(),
            corp_code: config.corp_code.clone(),
            payment_details: details,
            checksum: String::new(),
        }
    }
}

impl BankRequest for FundTransfer {
    const ENDPOINT: Endpoint = Endpoint::FundTransfer;

    fn validate(&self) -> Vec<FieldError> {
        let mut rules = Rules::nested("paymentDetails");
        validation::payment_details(&self.payment_details, &mut rules);
        rules.finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferStatusRequest {
    pub channel_id: String,
    pub corp_code: String,
    pub crn: String,
    pub checksum: String,
}

impl TransferStatusRequest {
    pub fn new(config: &ClientConfig, crn: &str) -> Self {
        Self {
            channel_id: config.channel_id.clone(),
            corp_code: config.corp_code.clone(),
            crn: crn.trim().to_string(),
            checksum: String::new(),
        }
    }
}

impl BankRequest for TransferStatusRequest {
    const ENDPOINT: Endpoint = Endpoint::TransferStatus;

    fn validate(&self) -> Vec<FieldError> {
        let mut rules = Rules::new();
        validation::crn(&self.crn, &mut rules);
        rules.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpay_sdk_core::checksum;

    fn config() -> ClientConfig {
        ClientConfig::from_lookup(|name| {
            Some(match name {
                "CORPAY_ENV" => "uat",
                "CORPAY_CHANNEL_ID" => "C1",
                "CORPAY_CORP_CODE" => "X",
                "CORPAY_TIMEOUT_MS" | "CORPAY_MAX_RETRIES" => "1",
                _ => "x",
            }
            .to_string())
        })
        .unwrap()
    }

    fn keys(value: &Value) -> Vec<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn test_balance_wire_order_and_checksum() {
        let request = BalanceRequest::new(&config(), "309010100067740");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(keys(&value), ["corpAccNum", "channelId", "corpCode", "checksum"]);
        assert_eq!(checksum::digest(&value), "7da9361bd1ad719c22cc7b0c1b8234fb");
    }

    #[test]
    fn test_registration_checksum_covers_records() {
        let record = BeneficiaryRecord {
            bene_code: "A".into(),
            ..Default::default()
        };
        let mut request = BeneficiaryRegistration::new(&config(), vec![record]);
        request.user_id = String::new();
        let value = serde_json::to_value(&request).unwrap();
        // channelId, corpCode, then apiVersion and beneCode of the record
        assert_eq!(checksum::canonicalize(&value), "C1X1.0A");
    }

    #[test]
    fn test_registration_generates_codes() {
        let request = BeneficiaryRegistration::new(
            &config(),
            vec![BeneficiaryRecord::default(), BeneficiaryRecord::default()],
        );
        let codes: Vec<_> = request.beneinsert.iter().map(|r| r.bene_code.clone()).collect();
        assert!(codes.iter().all(|c| c.starts_with("BENE")));
        assert_ne!(codes[0], codes[1]);
    }

    #[test]
    fn test_registration_needs_a_record() {
        let request = BeneficiaryRegistration::new(&config(), vec![]);
        let errors = request.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "beneinsert");
    }

    #[test]
    fn test_enquiry_defaults() {
        let request = BeneficiaryEnquiry::new(&config(), BeneficiaryQuery::default());
        assert_eq!(request.status, "All");
        assert!(request.validate().is_empty());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            keys(&value),
            ["channelId", "corpCode", "beneCode", "status", "emailId", "checksum"]
        );
    }

    #[test]
    fn test_transfer_wire_shape() {
        let transfer = FundTransfer::new(
            &config(),
            PaymentDetails {
                txn_paymode: "NE".into(),
                cust_uniq_ref: " REF001 ".into(),
                txn_amount: "500.00".into(),
                ..Default::default()
            },
        );
        assert_eq!(transfer.payment_details.txn_type, "CUST");
        assert_eq!(transfer.payment_details.cust_uniq_ref, "REF001");

        let value = serde_json::to_value(&transfer).unwrap();
        assert_eq!(keys(&value), ["channelId", "corpCode", "paymentDetails", "checksum"]);

        let details = &value["paymentDetails"];
        assert_eq!(details["invoiceDetails"], serde_json::json!({}));
        assert_eq!(details["beneLEI"], "");
        let detail_keys = keys(details);
        assert_eq!(detail_keys.first().map(String::as_str), Some("txnPaymode"));
        assert_eq!(detail_keys.last().map(String::as_str), Some("senderToReceiverInfo"));
        assert_eq!(checksum::canonicalize(&value), "C1XNEREF001CUST500.00");
    }

    #[test]
    fn test_transfer_validation_prefixes_fields() {
        let transfer = FundTransfer::new(&config(), PaymentDetails::default());
        let errors = transfer.validate();
        assert!(errors.iter().all(|e| e.field.starts_with("paymentDetails.")));
        assert!(errors.iter().any(|e| e.field == "paymentDetails.txnAmount"));
    }

    #[test]
    fn test_status_request() {
        let request = TransferStatusRequest::new(&config(), " CRN42 ");
        assert_eq!(request.crn, "CRN42");
        assert!(request.validate().is_empty());
        assert!(!TransferStatusRequest::new(&config(), "").validate().is_empty());
    }
}
