use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use level_quest::engine::{EntryOutcome, FeedbackKind, Phase, Selection};

use crate::app::{App, MenuOption, Screen};

pub fn draw_ui(f: &mut Frame, app: &App) {
    if matches!(app.screen, Screen::TitleScreen) {
        draw_title_screen(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(7),
        ])
        .split(f.area());

    draw_status_bar(f, app, chunks[0]);

    if matches!(app.screen, Screen::GameOver) {
        draw_game_over(f, app, chunks[1]);
    } else {
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        draw_prompt(f, app, main_chunks[0]);
        if app.engine.current_entry().is_some_and(|e| e.is_open()) {
            f.render_widget(&app.journal, main_chunks[1]);
        } else {
            draw_choices(f, app, main_chunks[1]);
        }
    }

    draw_feedback(f, app, chunks[2]);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let report = app.report();
    let mut spans = vec![
        Span::styled(
            " LEVEL QUEST ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", app.engine.table().meta.title),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Level {}/{} ", report.current_level, report.total_levels),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Score: {}/{} ", report.score, report.max_score),
            Style::default().fg(Color::Yellow),
        ),
    ];

    if let Some(secs) = app.engine.feedback().time_remaining {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" Time: {}s ", secs),
            Style::default().fg(if secs > 5 {
                Color::Green
            } else if secs > 2 {
                Color::Yellow
            } else {
                Color::Red
            }),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status, area);
}

fn draw_prompt(f: &mut Frame, app: &App, area: Rect) {
    if app.engine.rules().consume_choices {
        draw_match_items(f, app, area);
        return;
    }
    let prompt = app
        .engine
        .current_entry()
        .map(|e| e.prompt.as_str())
        .unwrap_or_default();
    let widget = Paragraph::new(prompt)
        .block(Block::default().borders(Borders::ALL).title(" Question "))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(widget, area);
}

/// Left-hand column of a matching game: every item, with finished pairs locked.
fn draw_match_items(f: &mut Frame, app: &App, area: Rect) {
    let state = app.engine.state();
    let lines: Vec<Line> = app
        .engine
        .table()
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (mark, style) = match state.outcomes.get(i).copied().flatten() {
                Some(EntryOutcome::Correct) => ("✓", Style::default().fg(Color::Green)),
                Some(_) => ("✗", Style::default().fg(Color::Red)),
                None if i == state.current_index => (
                    "▶",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                None => (" ", Style::default().fg(Color::White)),
            };
            Line::from(Span::styled(format!(" {mark} {}", entry.prompt), style))
        })
        .collect();

    let matched = state.outcomes.iter().filter(|o| o.is_some()).count();
    let title = format!(" Match these ({matched}/{} matched) ", state.outcomes.len());
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn draw_choices(f: &mut Frame, app: &App, area: Rect) {
    let Some(entry) = app.engine.current_entry() else {
        return;
    };
    let state = app.engine.state();
    let selected = match &state.selection {
        Some(Selection::Choice(id)) => Some(id.as_str()),
        _ => None,
    };
    let revealed = matches!(state.phase, Phase::Submitted { .. });

    let lines: Vec<Line> = entry
        .choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let is_selected = selected == Some(choice.id.as_str());
            let used = !app.engine.is_choice_available(&choice.id);
            let marker = if i == app.cursor { "▶" } else { " " };
            let icon = choice.icon.as_deref().map(|tag| format!("{tag} ")).unwrap_or_default();
            let text = format!(" {marker} {}. {icon}{}", i + 1, choice.text);

            let style = if used && !is_selected {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if revealed && choice.correct {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else if revealed && is_selected {
                Style::default().fg(Color::White).bg(Color::Red)
            } else if is_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if i == app.cursor {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    let help = if app.engine.rules().instant {
        " Choices [↑/↓ + ENTER or 1-9: Answer | q: Quit] "
    } else {
        " Choices [↑/↓ + SPACE or 1-9: Select | ENTER: Submit | q: Quit] "
    };
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(help))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn draw_feedback(f: &mut Frame, app: &App, area: Rect) {
    let feedback = app.engine.feedback();
    let (message, style, title) = if matches!(app.screen, Screen::GameOver) {
        let next = if app.next.id.is_some() { "  n: Next game  •" } else { "" };
        (
            format!("r: Replay  •{next}  q: Quit"),
            Style::default().fg(Color::DarkGray),
            " What now? ",
        )
    } else if feedback.visible {
        match feedback.kind {
            Some(FeedbackKind::Correct) => (
                feedback.message.clone(),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                " CORRECT! ",
            ),
            Some(FeedbackKind::Incorrect) => (
                feedback.message.clone(),
                Style::default().fg(Color::White).bg(Color::Red),
                " Oops ",
            ),
            _ => (
                feedback.message.clone(),
                Style::default().fg(Color::Cyan),
                " Hint ",
            ),
        }
    } else {
        (
            "Pick an answer. Take your time!".to_string(),
            Style::default().fg(Color::DarkGray),
            " Feedback ",
        )
    };

    let widget = Paragraph::new(message)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .style(style);
    f.render_widget(widget, area);
}

fn draw_game_over(f: &mut Frame, app: &App, area: Rect) {
    let report = app.report();
    let state = app.engine.state();
    let perfect = report.score == report.max_score;
    let badge = report
        .badge_earned
        .as_ref()
        .map(|name| format!("\n\n  BADGE EARNED: {name}"))
        .unwrap_or_default();
    let confetti = if report.show_confetti { "  * * * GREAT JOB! * * *\n\n" } else { "" };

    let text = format!(
        "{confetti}=== {} COMPLETE! ==={}\n\n\
        ╔══════════════════════════╗\n\
        ║  GAME STATS              ║\n\
        ╠══════════════════════════╣\n\
        ║  Levels played:    {:>4}  ║\n\
        ║  Correct answers:  {:>4}  ║\n\
        ║  Best streak:      {:>4}  ║\n\
        ║  Score:       {:>4}/{:<4}  ║\n\
        ║  Coins earned:     {:>4}  ║\n\
        ║  XP:               {:>4}  ║\n\
        ╚══════════════════════════╝{badge}",
        app.engine.table().meta.title.to_uppercase(),
        if perfect { " PERFECT RUN!" } else { "" },
        report.total_levels,
        state.correct_count,
        state.best_streak,
        report.score,
        report.max_score,
        report.coins_earned,
        report.total_xp,
    );

    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" GAME OVER "))
        .style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let area = f.area();
    let table = app.engine.table();

    let title_art = format!(
        r#"
    ╔═══════════════════════════════════════════════════════════╗
    ║                                                           ║
    ║     ██╗     ███████╗██╗   ██╗███████╗██╗                  ║
    ║     ██║     ██╔════╝██║   ██║██╔════╝██║                  ║
    ║     ██║     █████╗  ██║   ██║█████╗  ██║                  ║
    ║     ██║     ██╔══╝  ╚██╗ ██╔╝██╔══╝  ██║                  ║
    ║     ███████╗███████╗ ╚████╔╝ ███████╗███████╗             ║
    ║     ╚══════╝╚══════╝  ╚═══╝  ╚══════╝╚══════╝             ║
    ║                                                           ║
    ║                     Q U E S T                             ║
    ║                                                           ║
    ╚═══════════════════════════════════════════════════════════╝

{}
{} levels  •  {} coins  •  {} XP
"#,
        table.meta.title,
        table.len(),
        app.rewards.total_coins,
        app.rewards.total_xp,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(19),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    let title = Paragraph::new(title_art)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let highlighted = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let play_style = if matches!(app.menu_selection, MenuOption::Play) {
        highlighted
    } else {
        Style::default().fg(Color::White)
    };
    let play = Paragraph::new("  PLAY  ")
        .style(play_style)
        .alignment(Alignment::Center);
    f.render_widget(play, chunks[1]);

    let quit_style = if matches!(app.menu_selection, MenuOption::Quit) {
        highlighted
    } else {
        Style::default().fg(Color::White)
    };
    let quit = Paragraph::new("  QUIT  ")
        .style(quit_style)
        .alignment(Alignment::Center);
    f.render_widget(quit, chunks[2]);

    let help = Paragraph::new("↑/↓ to select  •  ENTER to confirm  •  q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}
