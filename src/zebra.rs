//! ZPL (Zebra Programming Language) label command streams.
//!
//! Each label is emitted as a stored-format definition followed by one
//! recall block per copy; the printer caches the format under the name
//! `FORMAT` and fills in the data fields. The step driver produces four
//! labels per output container: container id (with barcode), container
//! name, operator + date, and step name.
//!
//! Only the command stream is produced here. Piping it to the print queue
//! is an external concern; the stream is kept as a file artifact so labels
//! can be re-printed later.

use crate::errors::Result;
use crate::model::Snapshot;

/// Wrap layout and data lines into one format-definition + recall stream.
fn build_zpl_format(format_lines: &[String], data_lines: &[String], copies: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("^XA".to_string()); // start format definition
    lines.push("^DFFORMAT^FS".to_string()); // store under the name FORMAT
    lines.push("^LH0,0".to_string()); // label home position
    lines.extend_from_slice(format_lines);
    lines.push("^XZ".to_string());
    for _ in 0..copies {
        lines.push("^XA".to_string());
        lines.push("^XFFORMAT^FS".to_string()); // recall the stored format
        lines.extend_from_slice(data_lines);
        lines.push("^XZ".to_string());
    }
    lines
}

/// Container id as human-readable text plus a Code 128 barcode.
pub fn container_id_label(container_id: &str, copies: usize) -> Vec<String> {
    let format_lines = vec![
        "^FO360,30^AFN 78,39^FN1^FS".to_string(),
        "^FO70,10^BCN,70,N,N^FN2^FS".to_string(),
    ];
    let data_lines = vec![
        format!("^FN1^FD{container_id}^FS"),
        format!("^FN2^FD{container_id}^FS"),
    ];
    build_zpl_format(&format_lines, &data_lines, copies)
}

/// Container name as human-readable text, font scaled to fit.
pub fn container_name_label(container_name: &str, copies: usize) -> Vec<String> {
    let format_lines = vec![if container_name.len() > 21 {
        "^FO20,40^AFN 54,30^FN1^FS".to_string()
    } else {
        "^FO20,30^AFN 78,39^FN1^FS".to_string()
    }];
    let data_lines = vec![format!("^FN1^FD{container_name}^FS")];
    build_zpl_format(&format_lines, &data_lines, copies)
}

/// Operator name and date side by side. Operator names longer than 19
/// characters are truncated to fit the field.
pub fn operator_and_date_label(operator: &str, date: &str, copies: usize) -> Vec<String> {
    let format_lines = vec![
        "^FO420,35^ADN,36,20^FN1^FS".to_string(),
        "^FO20,35^ADN,36,20^FN2^FS".to_string(),
    ];
    let operator: String = operator.chars().take(19).collect();
    let data_lines = vec![
        format!("^FN1^FD{date}^FS"),
        format!("^FN2^FD{operator}^FS"),
    ];
    build_zpl_format(&format_lines, &data_lines, copies)
}

/// Step name as human-readable text, font scaled to fit.
pub fn step_name_label(step_name: &str, copies: usize) -> Vec<String> {
    let format_lines = vec![if step_name.len() > 21 {
        "^FO20,40^ADN 54,30^FN1^FS".to_string()
    } else {
        "^FO20,30^AFN 78,39^FN1^FS".to_string()
    }];
    let data_lines = vec![format!("^FN1^FD{step_name}^FS")];
    build_zpl_format(&format_lines, &data_lines, copies)
}

/// The full label set for a step: four labels per output container.
pub fn step_labels(snapshot: &Snapshot, date: &str) -> Result<Vec<String>> {
    let mut zpl = Vec::new();
    for container in snapshot.output_containers(&snapshot.step)? {
        log::info!(
            "Making label for container ID with barcode: {}",
            container.id
        );
        zpl.extend(container_id_label(&container.id, 1));

        log::info!("Making label for container name: {}", container.name);
        zpl.extend(container_name_label(&container.name, 1));

        log::info!(
            "Making label for operator and date: {} {date}",
            snapshot.step.technician
        );
        zpl.extend(operator_and_date_label(&snapshot.step.technician, date, 1));

        log::info!("Making label for step name: {}", snapshot.step.type_name);
        zpl.extend(step_name_label(&snapshot.step.type_name, 1));
    }
    Ok(zpl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_format_block_and_one_recall_per_copy() {
        let lines = container_id_label("27-1234", 3);
        assert_eq!(lines.iter().filter(|l| *l == "^DFFORMAT^FS").count(), 1);
        assert_eq!(lines.iter().filter(|l| *l == "^XFFORMAT^FS").count(), 3);
        // Every block is balanced.
        assert_eq!(
            lines.iter().filter(|l| *l == "^XA").count(),
            lines.iter().filter(|l| *l == "^XZ").count()
        );
    }

    #[test]
    fn long_names_use_the_smaller_font() {
        let short = container_name_label("Plate 1", 1);
        let long = container_name_label("An unreasonably long container name", 1);
        assert!(short.iter().any(|l| l.contains("78,39")));
        assert!(long.iter().any(|l| l.contains("54,30")));
    }

    #[test]
    fn long_operator_names_truncate() {
        let lines = operator_and_date_label("Maximiliana Langenscheidt", "2026-08-06", 1);
        assert!(lines.iter().any(|l| l.contains("^FDMaximiliana Langens^FS")));
    }

    #[test]
    fn data_fields_carry_the_payload() {
        let lines = container_id_label("27-1234", 1);
        assert_eq!(
            lines.iter().filter(|l| l.contains("^FD27-1234^FS")).count(),
            2
        );
    }
}
