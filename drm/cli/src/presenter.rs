use drm_core::{Record, title_case};

const LABEL_WIDTH: usize = 30;
const RULE_WIDTH: usize = 30;

/**
    Render a record as an aligned `Label : value` block under a title.
*/
pub fn render(title: &str, record: &Record) -> String {
    let rule = "-".repeat(RULE_WIDTH);

    let mut lines = Vec::with_capacity(record.len() + 3);
    lines.push(format!("--- {title} ---"));
    lines.push(rule.clone());
    for (name, value) in record.iter() {
        lines.push(format!(
            "{:<width$}: {value}",
            title_case(name),
            width = LABEL_WIDTH
        ));
    }
    lines.push(rule);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use drm_core::FieldValue;

    #[test]
    fn renders_labels_and_values() {
        let record = Record::new()
            .with("group_certificate_length", FieldValue::UInt(1234))
            .with("crc_valid", FieldValue::Bool(true))
            .with("magic_valid", FieldValue::Bool(false))
            .with("vmp", FieldValue::Absent)
            .with("EC Cert SN", FieldValue::Text("1f2e".into()));

        let text = render("Parsed Widevine Data", &record);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "--- Parsed Widevine Data ---");
        assert_eq!(lines[1], "-".repeat(RULE_WIDTH));
        assert_eq!(lines[2], format!("{:<30}: 1,234", "Group Certificate Length"));
        assert_eq!(lines[3], format!("{:<30}: Enabled", "Crc Valid"));
        assert_eq!(lines[4], format!("{:<30}: Disabled", "Magic Valid"));
        assert_eq!(lines[5], format!("{:<30}: N/A", "Vmp"));
        assert_eq!(lines[6], format!("{:<30}: 1f2e", "EC Cert SN"));
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn empty_record() {
        let text = render("Empty", &Record::new());
        assert_eq!(text.lines().count(), 3);
    }
}
