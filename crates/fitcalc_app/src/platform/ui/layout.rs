use super::constants::COLUMN_GAP;

/// Lay out `rows` under `headers` with every column padded to its widest cell.
pub fn table<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| cell_width(h.as_ref())).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate().take(columns) {
            widths[index] = widths[index].max(cell_width(cell.as_ref()));
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().map(|h| h.as_ref()), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_row(&mut out, row.iter().map(|c| c.as_ref()), &widths);
    }
    out
}

/// Two-column label/value listing.
pub fn key_values<S: AsRef<str>>(pairs: &[(S, S)]) -> String {
    let width = pairs
        .iter()
        .map(|(label, _)| cell_width(label.as_ref()))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (label, value) in pairs {
        let label = label.as_ref();
        out.push_str(label);
        out.push_str(&" ".repeat(width - cell_width(label)));
        out.push_str(COLUMN_GAP);
        out.push_str(value.as_ref());
        out.push('\n');
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (index, (cell, width)) in cells.zip(widths).enumerate() {
        if index > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        line.push_str(&" ".repeat(width - cell_width(cell)));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn cell_width(cell: &str) -> usize {
    cell.chars().count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn columns_are_padded_to_widest_cell() {
        let out = table(
            &["Name", "Qty"],
            &[vec!["Damage Control II", "1"], vec!["Nanite", "1,500"]],
        );
        assert_eq!(
            out,
            "Name               Qty\n\
             -----------------  -----\n\
             Damage Control II  1\n\
             Nanite             1,500\n"
        );
    }

    #[test]
    fn multibyte_cells_count_as_single_columns() {
        let out = table(&["JITA", "C-J"], &[vec!["X ×1", ""]]);
        assert_eq!(out, "JITA  C-J\n----  ---\nX ×1\n");
    }

    #[test]
    fn key_values_align_labels() {
        let out = key_values(&[("Total Volume", "5"), ("Jita Market Price", "100")]);
        assert_eq!(out, "Total Volume       5\nJita Market Price  100\n");
    }
}
