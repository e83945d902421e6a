use anyhow::Result;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{debug, info};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::{io, time::Duration};
use textwrap::wrap;

use parley::delivery::DeliveryUpdate;
use parley::models::{Conversation, ConversationSummary};
use parley::render::{self, BubbleSide, MessageView, StatusIcon};
use parley::selector::LayoutMode;
use parley::ChatSession;

// Export types needed by main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

/// Width of the sidebar in the wide layout
const SIDEBAR_WIDTH: u16 = 34;

/// Bubbles take at most this share of the thread width
const BUBBLE_WIDTH_PERCENT: usize = 70;

const HELP_POPUP_HEIGHT: u16 = 18;

const HELP_LINE: &str =
    "ESC quit | TAB switch | ↑/↓ choose | Enter select/send | Ctrl+B sidebar | Ctrl+H help";

// (key, description); an empty description marks a section header
const SHORTCUTS: [(&str, &str); 16] = [
    ("General", ""),
    ("ESC", "Quit"),
    ("Tab", "Switch between conversations and composer"),
    ("Ctrl+B", "Show or hide the conversation list"),
    ("Ctrl+H", "Show this help"),
    ("", ""),
    ("Conversations", ""),
    ("↑/↓", "Move through conversations"),
    ("Enter", "Open the highlighted conversation"),
    ("", ""),
    ("Composer", ""),
    ("Enter", "Send message"),
    ("Shift+Enter", "Insert a line break"),
    ("Alt+Enter", "Insert a line break"),
    ("", ""),
    ("Press any key to close this dialog", ""),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Composer,
}

pub struct ChatUI {
    session: ChatSession,
    focus: Focus,
    help_open: bool,
}

impl ChatUI {
    pub fn new(session: ChatSession) -> Self {
        ChatUI {
            session,
            focus: Focus::Composer,
            help_open: false,
        }
    }

    /// Recomputes the layout mode for the current terminal width.
    pub fn resize(&mut self, width: u16, narrow_below: u16) {
        self.session.set_layout(LayoutMode::for_width(width, narrow_below));
    }

    pub fn apply_delivery(&mut self, update: DeliveryUpdate) {
        self.session.apply(update);
    }

    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }

    /// Polls for one key press. Returns true when the user asked to quit.
    pub fn handle_input(&mut self) -> Result<bool> {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(false)
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Any key closes the help dialog
        if self.help_open {
            self.help_open = false;
            return false;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('h') | KeyCode::Char('H') if ctrl => {
                self.help_open = true;
            }
            KeyCode::Char('b') if ctrl => {
                self.session.toggle_sidebar();
                self.focus = if self.session.selector().is_overlay_open() {
                    Focus::Sidebar
                } else {
                    Focus::Composer
                };
            }
            KeyCode::Tab => self.switch_focus(),
            _ => match self.focus {
                Focus::Sidebar => self.handle_sidebar_key(key),
                Focus::Composer => {
                    if let Some(id) = self.session.handle_composer_key(key) {
                        debug!("UI: message {} queued for delivery", id);
                    }
                }
            },
        }
        false
    }

    fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Composer,
            Focus::Composer => Focus::Sidebar,
        };

        // On a narrow terminal the sidebar only exists while it has focus
        if self.session.selector().layout() == LayoutMode::Narrow {
            let want_open = self.focus == Focus::Sidebar;
            if self.session.selector().is_overlay_open() != want_open {
                self.session.toggle_sidebar();
            }
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.session.highlight_previous(),
            KeyCode::Down => self.session.highlight_next(),
            KeyCode::Enter => {
                if self.session.select_highlighted() {
                    info!("UI: switched to conversation {:?}", self.session.store().active_id());
                    self.focus = Focus::Composer;
                }
            }
            _ => {}
        }
    }

    pub fn draw<B: Backend>(&self, frame: &mut Frame<B>) {
        let size = frame.size();
        let selector = self.session.selector();

        let main_area = match selector.layout() {
            LayoutMode::Wide => {
                let chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
                    .split(size);
                self.draw_sidebar(frame, chunks[0]);
                chunks[1]
            }
            LayoutMode::Narrow => size,
        };

        match self.session.store().active_conversation() {
            Some(conversation) => self.draw_conversation(frame, conversation, main_area),
            None => draw_welcome(frame, main_area, self.pending_receipts()),
        }

        // Narrow layout: the sidebar floats over the thread
        if selector.layout() == LayoutMode::Narrow && selector.sidebar_visible() {
            let overlay = Rect::new(size.x, size.y, SIDEBAR_WIDTH.min(size.width), size.height);
            frame.render_widget(Clear, overlay);
            self.draw_sidebar(frame, overlay);
        }

        if self.help_open {
            draw_help_dialog(frame, size);
        }
    }

    fn pending_receipts(&self) -> usize {
        self.session.simulator().pending()
    }

    fn draw_sidebar<B: Backend>(&self, frame: &mut Frame<B>, area: Rect) {
        let store = self.session.store();
        let highlighted = self.session.selector().highlighted();
        let active = store.active_id();
        let text_width = area.width.saturating_sub(4) as usize;

        let items: Vec<ListItem> = store
            .summaries()
            .iter()
            .enumerate()
            .map(|(i, summary)| {
                let is_active = active == Some(summary.id.as_str());
                sidebar_item(summary, i == highlighted, is_active, text_width)
            })
            .collect();

        let border_style = match self.focus {
            Focus::Sidebar => Style::default().fg(Color::Yellow),
            Focus::Composer => Style::default(),
        };
        let list = List::new(items).block(
            Block::default()
                .title("Messages (Tab to focus)")
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(list, area);
    }

    fn draw_conversation<B: Backend>(
        &self,
        frame: &mut Frame<B>,
        conversation: &Conversation,
        area: Rect,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Min(5),    // Thread
                Constraint::Length(3), // Composer
                Constraint::Length(1), // Help line
            ])
            .split(area);

        draw_header(frame, conversation, chunks[0]);
        draw_thread(frame, &render::thread_view(&conversation.messages), chunks[1]);
        self.draw_composer(frame, chunks[2]);
        draw_help_line(frame, chunks[3], self.pending_receipts());
    }

    fn draw_composer<B: Backend>(&self, frame: &mut Frame<B>, area: Rect) {
        let composer = self.session.composer();
        let border_style = match self.focus {
            Focus::Composer => Style::default().fg(Color::Yellow),
            Focus::Sidebar => Style::default(),
        };

        // Line breaks are shown as a single glyph so the cursor column stays right
        let shown = composer.value().replace('\n', "↵");
        let (text, style) = if shown.is_empty() {
            ("Type a message...".to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (shown, Style::default())
        };

        let title = format!("Message as {}", self.session.store().local_user().name);
        let input = Paragraph::new(text).style(style).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        frame.render_widget(input, area);

        if self.focus == Focus::Composer && !self.help_open {
            frame.set_cursor(area.x + composer.cursor() as u16 + 1, area.y + 1);
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= width {
        flat
    } else {
        let kept: String = flat.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

fn sidebar_item(
    summary: &ConversationSummary,
    highlighted: bool,
    active: bool,
    width: usize,
) -> ListItem<'static> {
    let marker = if highlighted { "> " } else { "  " };
    let presence = if summary.online {
        Span::styled("● ", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ ", Style::default().fg(Color::DarkGray))
    };

    let name_style = if active {
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut title = vec![
        Span::raw(marker),
        presence,
        Span::styled(summary.name.clone(), name_style),
        Span::styled(format!(" {}", summary.timestamp), Style::default().fg(Color::DarkGray)),
    ];
    if summary.unread > 0 {
        title.push(Span::styled(
            format!(" ({})", summary.unread),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));
    }

    let preview = Line::from(Span::styled(
        format!("    {}", truncate(&summary.preview, width.saturating_sub(4))),
        Style::default().fg(Color::Gray),
    ));

    ListItem::new(vec![Line::from(title), preview])
}

fn draw_header<B: Backend>(frame: &mut Frame<B>, conversation: &Conversation, area: Rect) {
    let avatar = Span::styled(
        format!(" {} ", render::initials(&conversation.name)),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    );
    let presence_style = if conversation.online {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines = vec![
        Line::from(vec![
            avatar,
            Span::raw(" "),
            Span::styled(conversation.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(conversation.presence_label(), presence_style)),
    ];

    frame.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL)), area);
}

fn status_span(icon: StatusIcon) -> Span<'static> {
    let style = if icon.is_emphasized() {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!(" {}", icon.glyph()), style)
}

fn pad_for(side: BubbleSide, used: usize, width: usize) -> String {
    match side {
        BubbleSide::Left => String::new(),
        BubbleSide::Right => " ".repeat(width.saturating_sub(used)),
    }
}

fn draw_thread<B: Backend>(frame: &mut Frame<B>, views: &[MessageView], area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize; // Account for borders
    let bubble_width = (inner_width * BUBBLE_WIDTH_PERCENT / 100).max(10);

    let mut items: Vec<ListItem> = Vec::new();
    for (i, view) in views.iter().enumerate() {
        let message = view.message;

        if view.show_avatar {
            if i > 0 {
                items.push(ListItem::new(""));
            }
            items.push(ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", render::initials(&message.sender.name)),
                    Style::default().fg(Color::Black).bg(Color::Magenta),
                ),
                Span::styled(
                    format!(" {}", message.sender.name),
                    Style::default().fg(Color::Magenta),
                ),
            ])));
        }

        let bubble_style = match view.side {
            BubbleSide::Right => Style::default().fg(Color::LightBlue),
            BubbleSide::Left => Style::default(),
        };
        for line in wrap(&message.content, bubble_width) {
            let pad = pad_for(view.side, line.chars().count(), inner_width);
            items.push(ListItem::new(Line::from(vec![
                Span::raw(pad),
                Span::styled(line.into_owned(), bubble_style),
            ])));
        }

        let mut meta = vec![Span::styled(
            message.timestamp.clone(),
            Style::default().fg(Color::DarkGray),
        )];
        let mut used = message.timestamp.chars().count();
        if let Some(icon) = view.status {
            used += icon.glyph().chars().count() + 1;
            meta.push(status_span(icon));
        }
        meta.insert(0, Span::raw(pad_for(view.side, used, inner_width)));
        items.push(ListItem::new(Line::from(meta)));
    }

    // Keep the newest line in view
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(items.len() - 1));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_help_line<B: Backend>(frame: &mut Frame<B>, area: Rect, pending_receipts: usize) {
    let mut spans = vec![Span::styled(HELP_LINE, Style::default().fg(Color::Gray))];
    if pending_receipts > 0 {
        spans.push(Span::styled(
            format!(" | {} receipts pending", pending_receipts),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_welcome<B: Backend>(frame: &mut Frame<B>, area: Rect, pending_receipts: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let lines = vec![
        Line::from(Span::styled("Welcome to Chat", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            "Select a conversation to start messaging",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let welcome = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(welcome, chunks[0]);
    draw_help_line(frame, chunks[1], pending_receipts);
}

fn draw_help_dialog<B: Backend>(f: &mut Frame<B>, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 64.min(area.width.saturating_sub(4));
    let popup_height = HELP_POPUP_HEIGHT.min(area.height.saturating_sub(4));

    let popup_x = (area.width - popup_width) / 2;
    let popup_y = (area.height - popup_height) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    let popup_block = Block::default()
        .title("Keyboard Shortcuts")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    f.render_widget(Clear, popup_area); // Clear the area first
    f.render_widget(popup_block, popup_area);

    let inner_area = popup_area.inner(&Margin {
        vertical: 1,
        horizontal: 2,
    });

    let items: Vec<ListItem> = SHORTCUTS
        .iter()
        .map(|(key, desc)| {
            if desc.is_empty() {
                if key.is_empty() {
                    ListItem::new("")
                } else {
                    // Category header
                    ListItem::new(Text::styled(
                        key.to_string(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ))
                }
            } else {
                let line = Line::from(vec![
                    Span::styled(format!("{:<13}", key), Style::default().fg(Color::Green)),
                    Span::raw(desc.to_string()),
                ]);
                ListItem::new(line)
            }
        })
        .collect();

    f.render_widget(List::new(items), inner_area);
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    // Without this Shift+Enter arrives as a plain Enter
    if supports_keyboard_enhancement()? {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    } else {
        debug!("Terminal has no keyboard enhancement, Shift+Enter will send");
    }
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    if supports_keyboard_enhancement()? {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
