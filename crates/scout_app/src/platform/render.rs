use scout_core::{AppViewModel, Severity};

/// Progress line for a search in flight, if one is running.
pub fn render_progress(view: &AppViewModel) -> Option<String> {
    if !view.loading {
        return None;
    }
    Some(match &view.status_line {
        Some(status) => format!("{} {}", view.search_label, status),
        None => format!("{} submitting \"{}\"", view.search_label, view.params.query),
    })
}

/// Result cards, one block per item, under a heading.
pub fn render_results(view: &AppViewModel) -> Vec<String> {
    if view.cards.is_empty() {
        return vec!["No results.".to_string()];
    }
    let mut lines = Vec::with_capacity(view.cards.len() * 4 + 1);
    lines.push(format!("Search Results ({})", view.cards.len()));
    for card in &view.cards {
        lines.push(format!("#{}", card.index + 1));
        lines.push(format!("  Title: {}", card.title));
        lines.push(format!("  URL:   {}", card.url));
        lines.push(format!("  Date:  {}", card.date));
    }
    lines
}

pub fn render_notice(view: &AppViewModel) -> Option<String> {
    view.notice.as_ref().map(|notice| match notice.severity {
        Severity::Info => notice.text.clone(),
        Severity::Error => format!("error: {}", notice.text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scout_core::{update, AppState, JobHandle, Msg, ResultItem};

    #[test]
    fn renders_one_card_per_result() {
        let (state, _) = update(AppState::new(), Msg::SearchClicked);
        let (state, _) = update(
            state,
            Msg::ResultsFetched(vec![ResultItem::new(None, Some("http://y"), None)]),
        );

        assert_eq!(
            render_results(&state.view()),
            vec![
                "Search Results (1)",
                "#1",
                "  Title: N/A",
                "  URL:   http://y",
                "  Date:  N/A",
            ]
        );
        assert_eq!(render_progress(&state.view()), None);
    }

    #[test]
    fn progress_shows_run_status() {
        let (state, _) = update(AppState::new(), Msg::QueryChanged("ai".into()));
        let (state, _) = update(state, Msg::SearchClicked);
        assert_eq!(
            render_progress(&state.view()).as_deref(),
            Some("Searching... submitting \"ai\"")
        );

        let (state, _) = update(
            state,
            Msg::JobStarted(JobHandle {
                id: "run1".into(),
                dataset_id: "ds1".into(),
            }),
        );
        assert_eq!(
            render_progress(&state.view()).as_deref(),
            Some("Searching... Run run1: started")
        );
    }

    #[test]
    fn empty_results_say_so() {
        assert_eq!(render_results(&AppState::new().view()), vec!["No results."]);
    }
}
