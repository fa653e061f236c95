//! Excel export of a planned analysis

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use super::types::{ActionKind, ImportAnalysis};

/// Column headers for the actions sheet
const ACTION_HEADERS: [&str; 5] = ["#", "Action", "Name", "Path", "Message"];

/// Write an analysis to an Excel report: one sheet for the ordered
/// action list, one for row diagnostics.
pub fn write_plan_excel(analysis: &ImportAnalysis, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Actions")?;
    for (col, header) in ACTION_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }
    for (index, action) in analysis.actions().iter().enumerate() {
        let row = (index + 1) as u32;
        worksheet.write_number(row, 0, (index + 1) as f64)?;
        worksheet.write_string(row, 1, format_kind(&action.kind))?;
        worksheet.write_string(row, 2, &action.display_name)?;
        worksheet.write_string(row, 3, action.path.as_str())?;
        worksheet.write_string(row, 4, &action.message)?;
    }

    let diagnostics = workbook.add_worksheet();
    diagnostics.set_name("Diagnostics")?;
    diagnostics.write_string(0, 0, "Row")?;
    diagnostics.write_string(0, 1, "Message")?;
    for (index, diagnostic) in analysis.diagnostics.iter().enumerate() {
        let row = (index + 1) as u32;
        // 1-based row numbers, matching what users see in their spreadsheet
        diagnostics.write_number(row, 0, (diagnostic.row_index + 1) as f64)?;
        diagnostics.write_string(row, 1, &diagnostic.message)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel report: {}", path.display()))?;

    Ok(())
}

fn format_kind(kind: &ActionKind) -> String {
    match kind {
        ActionKind::CreateOu => "create-ou".to_string(),
        ActionKind::CreateGroup { kind } => format!("create-group ({})", kind.label()),
        ActionKind::DeleteOu { .. } => "delete-ou".to_string(),
        ActionKind::DeleteGroup { .. } => "delete-group".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::types::GroupKind;

    #[test]
    fn test_format_kind() {
        assert_eq!(format_kind(&ActionKind::CreateOu), "create-ou");
        assert_eq!(
            format_kind(&ActionKind::CreateGroup {
                kind: GroupKind::Security
            }),
            "create-group (security)"
        );
    }
}
