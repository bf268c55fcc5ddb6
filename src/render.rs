use crate::post_office::PostOffice;
use crate::session::SessionState;
use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

pub fn records_table(records: &[PostOffice]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Pincode", "District", "State"]);
    for record in records {
        table.add_row(vec![
            &record.name,
            &record.pincode,
            &record.district,
            &record.state,
        ]);
    }
    table
}

/// Text shown for the current state, in screen order.
pub fn render(state: &SessionState) -> String {
    let mut lines = Vec::new();
    if state.is_loading() {
        lines.push("Loading...".to_string());
    }
    if let Some(error) = state.error_message() {
        lines.push(error.to_string());
    }
    if !state.all_records().is_empty() {
        lines.push(format!("Pincode: {}", state.query()));
        lines.push(format!("Message: {}", state.found_message()));
        if !state.filter_term().is_empty() {
            lines.push(format!(
                "Filter: {} ({} shown)",
                state.filter_term(),
                state.visible_records().len()
            ));
        }
        lines.push(records_table(state.visible_records()).to_string());
    }
    lines.join("\n")
}

pub fn render_json(records: &[PostOffice]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> SessionState {
        let (state, _) = SessionState::new().apply_submit("110001");
        state.apply_fetch_success(
            0,
            vec![
                PostOffice::new("Connaught Place", "110001", "New Delhi", "Delhi"),
                PostOffice::new("Baroda House", "110001", "Central Delhi", "Delhi"),
            ],
        )
    }

    #[test]
    fn idle_renders_nothing() {
        assert_eq!(render(&SessionState::new()), "");
    }

    #[test]
    fn loading_and_error_lines() {
        let (loading, _) = SessionState::new().apply_submit("110001");
        assert_eq!(render(&loading), "Loading...");
        let (invalid, _) = SessionState::new().apply_submit("1");
        assert_eq!(render(&invalid), "Please enter a valid 6-digit pincode.");
    }

    #[test]
    fn results_show_header_and_visible_rows() {
        let state = loaded().apply_filter("baroda");
        let output = render(&state);
        assert!(output.contains("Pincode: 110001"));
        assert!(output.contains("Number of pincode(s) found: 2"));
        assert!(output.contains("Filter: baroda (1 shown)"));
        assert!(output.contains("Baroda House"));
        assert!(!output.contains("Connaught Place"));
    }

    #[test]
    fn json_lists_visible_records() {
        let state = loaded().apply_filter("connaught");
        let json = render_json(state.visible_records()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["Name"], "Connaught Place");
        assert_eq!(value.as_array().unwrap().len(), 1);
    }
}
