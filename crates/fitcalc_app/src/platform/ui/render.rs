use std::io::{self, Write};

use fitcalc_core::render::NO_RECOMMENDATIONS;
use fitcalc_core::{AppViewModel, ProgressView, RecommendationView};

use super::constants::*;
use super::layout::{key_values, table};

/// Writes progress to `status` as it changes and the result to `out` once.
pub struct TerminalView<O: Write, S: Write> {
    out: O,
    status: S,
    last_progress: Option<ProgressView>,
}

impl<O: Write, S: Write> TerminalView<O, S> {
    pub fn new(out: O, status: S) -> Self {
        Self {
            out,
            status,
            last_progress: None,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if self.last_progress.as_ref() != Some(&view.progress) {
            writeln!(self.status, "{}", progress_line(&view.progress))?;
            self.status.flush()?;
            self.last_progress = Some(view.progress.clone());
        }
        Ok(())
    }

    pub fn finish(&mut self, view: &AppViewModel) -> io::Result<()> {
        self.render(view)?;
        if let Some(text) = result_text(view) {
            self.out.write_all(text.as_bytes())?;
        }
        self.out.flush()
    }
}

pub fn progress_line(progress: &ProgressView) -> String {
    let filled = ((progress.percent / 100.0) * PROGRESS_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    format!(
        "[{}{}] {:>3.0}% {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        progress.percent,
        progress.status
    )
}

/// The three result regions, or `None` when nothing has been rendered.
pub fn result_text(view: &AppViewModel) -> Option<String> {
    let recommendations = view.recommendations.as_ref()?;
    let mut out = String::new();

    out.push_str(&heading(HEADING_TOTALS));
    let totals: Vec<(&str, &str)> = view
        .totals
        .iter()
        .map(|row| (row.label.as_str(), row.value.as_str()))
        .collect();
    out.push_str(&key_values(&totals));

    out.push('\n');
    out.push_str(&heading(HEADING_FITTING));
    for section in &view.sections {
        out.push('\n');
        out.push_str(&section.title);
        out.push('\n');
        let rows: Vec<Vec<&str>> = section.rows.iter().map(|row| row.cells().to_vec()).collect();
        let headers: Vec<&str> = section.headers.iter().map(String::as_str).collect();
        out.push_str(&table(&headers, &rows));
    }

    out.push('\n');
    out.push_str(&heading(HEADING_RECOMMENDATIONS));
    match recommendations {
        RecommendationView::Unavailable => {
            out.push_str(NO_RECOMMENDATIONS);
            out.push('\n');
        }
        RecommendationView::Table { columns, rows } => {
            let headers: Vec<&str> = columns.iter().map(String::as_str).collect();
            let rows: Vec<Vec<&str>> = rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.as_deref().unwrap_or("")).collect())
                .collect();
            out.push_str(&table(&headers, &rows));
        }
    }
    Some(out)
}

fn heading(title: &str) -> String {
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

#[cfg(test)]
mod tests {
    use fitcalc_core::{parse_message, update, AppState, Msg, StreamEvent, STATUS_DONE};
    use pretty_assertions::assert_eq;

    use super::*;

    const DONE: &str = r#"{"type":"done","parsed":{"Low Slots":[{"name":"X","qty":1,"volume":5,"subtotal_jita":100,"subtotal_gsf":120,"import_cost":20,"purchase_loc":"JITA","marked_up_price":110}]},"totals":{"volume":5,"subtotal_jita":100,"subtotal_gsf":120,"min_price":100,"markup_pct":10,"marked_up_price":110},"buy_lists":{"JITA":[{"name":"X","qty":1}],"C-J":[]}}"#;

    fn view_after(lines: &[&str]) -> AppViewModel {
        let (state, _) = update(AppState::new(), Msg::FittingChanged("fit".to_string()));
        let (mut state, _) = update(state, Msg::Submitted);
        for line in lines {
            let message = parse_message(line).expect("valid line");
            state = update(
                state,
                Msg::Stream {
                    generation: 1,
                    event: StreamEvent::Message(message),
                },
            )
            .0;
        }
        state.view()
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        let line = progress_line(&ProgressView {
            percent: 50.0,
            status: "Processing 1 of 2: Hull".to_string(),
        });
        assert_eq!(
            line,
            format!("[{}{}]  50% Processing 1 of 2: Hull", "#".repeat(15), "-".repeat(15))
        );
    }

    #[test]
    fn nothing_to_print_before_result() {
        assert_eq!(result_text(&view_after(&[])), None);
    }

    #[test]
    fn result_lists_totals_sections_and_recommendations() {
        let view = view_after(&[DONE]);
        assert_eq!(view.progress.status, STATUS_DONE);
        let text = result_text(&view).expect("rendered");

        assert!(text
            .lines()
            .any(|line| line.starts_with("Marked Up Price (+10%)") && line.ends_with("  110")));
        assert!(text.contains("\nLow Slots\n"));
        assert!(text.contains("Purchase Recommendations\n========================\nJITA  C-J\n----  ---\nX ×1\n"));
    }

    #[test]
    fn missing_buy_lists_print_placeholder() {
        let done = r#"{"type":"done","parsed":{},"totals":{"volume":0,"subtotal_jita":0,"subtotal_gsf":0,"min_price":0,"markup_pct":0,"marked_up_price":0}}"#;
        let text = result_text(&view_after(&[done])).expect("rendered");
        assert!(text.ends_with(&format!("{NO_RECOMMENDATIONS}\n")));
    }

    #[test]
    fn terminal_view_skips_unchanged_progress() {
        let view = view_after(&[]);
        let mut out = Vec::new();
        let mut status = Vec::new();
        {
            let mut terminal = TerminalView::new(&mut out, &mut status);
            terminal.render(&view).unwrap();
            terminal.render(&view).unwrap();
            terminal.finish(&view).unwrap();
        }
        let status = String::from_utf8(status).unwrap();
        assert_eq!(status.lines().count(), 1);
        assert!(status.ends_with("Starting...\n"));
        assert!(out.is_empty());
    }
}
