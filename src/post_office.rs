use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUCCESS_STATUS: &str = "Success";

/// One post office as returned by the lookup API. Field names follow the
/// API's PascalCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostOffice {
    pub name: String,
    pub pincode: String,
    pub district: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl PostOffice {
    pub fn new(name: &str, pincode: &str, district: &str, state: &str) -> Self {
        Self {
            name: name.to_string(),
            pincode: pincode.to_string(),
            district: district.to_string(),
            state: state.to_string(),
            description: None,
            branch_type: None,
            delivery_status: None,
            circle: None,
            division: None,
            region: None,
            block: None,
            country: None,
        }
    }

    /// Case-insensitive substring match on the name. An empty term matches.
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.to_lowercase())
    }
}

impl fmt::Display for PostOffice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name, self.pincode, self.district, self.state
        )
    }
}

/// Element 0 of the array the API returns.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PincodeResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub post_office: Option<Vec<PostOffice>>,
}

impl PincodeResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[{
        "Message": "Number of pincode(s) found:2",
        "Status": "Success",
        "PostOffice": [
            {"Name": "Baroda House", "Description": null, "BranchType": "Sub Post Office",
             "DeliveryStatus": "Non-Delivery", "Circle": "Delhi", "District": "Central Delhi",
             "Division": "New Delhi Central", "Region": "Delhi", "Block": "New Delhi",
             "State": "Delhi", "Country": "India", "Pincode": "110001"},
            {"Name": "Connaught Place", "District": "New Delhi", "State": "Delhi",
             "Pincode": "110001"}
        ]
    }]"#;

    #[test]
    fn parses_api_response() {
        let body: Vec<PincodeResponse> = serde_json::from_str(SAMPLE).unwrap();
        let response = &body[0];
        assert!(response.is_success());
        let offices = response.post_office.as_ref().unwrap();
        assert_eq!(offices.len(), 2);
        assert_eq!(offices[0].name, "Baroda House");
        assert_eq!(offices[0].branch_type.as_deref(), Some("Sub Post Office"));
        assert_eq!(offices[0].description, None);
        assert_eq!(
            offices[1],
            PostOffice::new("Connaught Place", "110001", "New Delhi", "Delhi")
        );
    }

    #[test]
    fn parses_error_response_with_null_offices() {
        let body: Vec<PincodeResponse> = serde_json::from_str(
            r#"[{"Message":"No records found","Status":"Error","PostOffice":null}]"#,
        )
        .unwrap();
        assert!(!body[0].is_success());
        assert!(body[0].post_office.is_none());
    }

    #[test]
    fn matches_is_case_insensitive_substring() {
        let office = PostOffice::new("Connaught Place", "110001", "New Delhi", "Delhi");
        assert!(office.matches("connaught"));
        assert!(office.matches("PLACE"));
        assert!(office.matches("ght pl"));
        assert!(office.matches(""));
        assert!(!office.matches("Baroda"));
    }
}
