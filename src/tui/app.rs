//! TUI application state and event loop

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};

use super::ui::{centered_rect, fit_cell, SelectableList, Styles};
use crate::api::client::DrugsClient;
use crate::config::Config;
use crate::controller::TableController;
use crate::models::{format_launch_date, QueryIntent, PAGE_SIZES};

/// Label of the dropdown entry that clears the company filter
const ALL_COMPANIES: &str = "All Companies";

// Table column widths (display columns)
const ID_WIDTH: usize = 5;
const CODE_WIDTH: usize = 8;
const NAME_WIDTH: usize = 32;
const COMPANY_WIDTH: usize = 22;
const DATE_WIDTH: usize = 10;

/// Interactive browser over the drug catalog table
pub struct App {
    config: Config,
    client: DrugsClient,
    pub controller: TableController,
    table_state: ListState,
    /// Company filter dropdown; `Some` while open
    company_dropdown: Option<SelectableList<String>>,
    status_message: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = DrugsClient::new(&config)?;

        Ok(Self {
            config,
            client,
            controller: TableController::new(),
            table_state: ListState::default(),
            company_dropdown: None,
            status_message: None,
            should_quit: false,
        })
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.controller
            .load_companies(&self.client, self.config.company_scan_limit)
            .await;
        self.controller.load_page(&self.client).await;
        self.reset_row_selection();

        loop {
            terminal.draw(|f| self.draw(f))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key).await?;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.company_dropdown.is_some() {
            self.handle_dropdown_event(key).await;
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.select_next_row(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous_row(),
            KeyCode::Right | KeyCode::Char('n') => self.next_page().await,
            KeyCode::Left | KeyCode::Char('p') => self.previous_page().await,
            KeyCode::Char('s') => self.cycle_page_size().await,
            KeyCode::Char('f') => self.open_company_dropdown(),
            KeyCode::Char('c') => {
                self.apply_intent(QueryIntent::SetCompany(None)).await;
            }
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Enter => self.filter_by_selected_row().await,
            _ => {}
        }

        Ok(())
    }

    async fn handle_dropdown_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(dropdown) = self.company_dropdown.as_mut() {
                    dropdown.previous();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(dropdown) = self.company_dropdown.as_mut() {
                    dropdown.next();
                }
            }
            KeyCode::Enter => {
                let choice = self
                    .company_dropdown
                    .take()
                    .and_then(|dropdown| dropdown.selected().cloned());
                if let Some(choice) = choice {
                    let company = if choice == ALL_COMPANIES {
                        None
                    } else {
                        Some(choice)
                    };
                    self.apply_intent(QueryIntent::SetCompany(company)).await;
                }
            }
            KeyCode::Esc => self.company_dropdown = None,
            _ => {}
        }
    }

    /// Apply an intent and reload the page when the state actually changed
    async fn apply_intent(&mut self, intent: QueryIntent) {
        if self.controller.dispatch(intent) {
            self.controller.load_page(&self.client).await;
            self.reset_row_selection();
            self.status_message = Some(format!(
                "Showing {} of {} records",
                self.controller.rows().len(),
                self.controller.total()
            ));
        }
    }

    async fn next_page(&mut self) {
        let page = self.controller.query().page;
        if page + 1 < self.controller.page_count() {
            self.apply_intent(QueryIntent::SetPage(page + 1)).await;
        }
    }

    async fn previous_page(&mut self) {
        let page = self.controller.query().page;
        if page > 0 {
            self.apply_intent(QueryIntent::SetPage(page - 1)).await;
        }
    }

    /// Cycle to the next allowed page size
    async fn cycle_page_size(&mut self) {
        let current = self.controller.query().page_size;
        let position = PAGE_SIZES.iter().position(|&s| s == current).unwrap_or(0);
        let next = PAGE_SIZES[(position + 1) % PAGE_SIZES.len()];
        self.apply_intent(QueryIntent::SetPageSize(next)).await;
    }

    fn open_company_dropdown(&mut self) {
        let mut items = vec![ALL_COMPANIES.to_string()];
        items.extend(self.controller.companies().iter().cloned());

        let mut dropdown = SelectableList::new(items);
        // Preselect the active filter
        let selected = match &self.controller.query().company {
            Some(company) => dropdown
                .items
                .iter()
                .position(|item| item == company)
                .unwrap_or(0),
            None => 0,
        };
        dropdown.select(Some(selected));
        self.company_dropdown = Some(dropdown);
    }

    /// Filter by the company shown in the selected row
    async fn filter_by_selected_row(&mut self) {
        let company = self
            .table_state
            .selected()
            .and_then(|i| self.controller.rows().get(i))
            .map(|row| row.company.clone());
        if let Some(company) = company {
            self.apply_intent(QueryIntent::SetCompany(Some(company)))
                .await;
        }
    }

    /// Re-fetch the company list and the current page
    async fn refresh(&mut self) {
        self.controller
            .load_companies(&self.client, self.config.company_scan_limit)
            .await;
        self.controller.load_page(&self.client).await;
        self.reset_row_selection();
        self.status_message = Some("Refreshed".to_string());
    }

    fn reset_row_selection(&mut self) {
        self.table_state.select(if self.controller.rows().is_empty() {
            None
        } else {
            Some(0)
        });
    }

    fn select_next_row(&mut self) {
        let count = self.controller.rows().len();
        if count == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn select_previous_row(&mut self) {
        let count = self.controller.rows().len();
        if count == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    count - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_table(f, chunks[1]);
        self.draw_status_bar(f, chunks[2]);

        if self.company_dropdown.is_some() {
            self.draw_company_dropdown(f, size);
        }
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let mut title = "Drug Catalog".to_string();
        if let Some(company) = &self.controller.query().company {
            title.push_str(&format!(" - Company: {}", company));
        }
        if self.controller.is_loading() {
            title.push_str(" - Loading...");
        }

        let style = if self.controller.is_loading() {
            Styles::title()
        } else {
            Styles::info()
        };

        let header = Paragraph::new(title)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn draw_table(&mut self, f: &mut Frame, area: Rect) {
        let mut items = Vec::new();

        let header = Line::from(vec![
            Span::styled(fit_cell("ID", ID_WIDTH), Styles::title()),
            Span::styled(" | ", Styles::title()),
            Span::styled(fit_cell("Code", CODE_WIDTH), Styles::title()),
            Span::styled(" | ", Styles::title()),
            Span::styled(fit_cell("Name", NAME_WIDTH), Styles::title()),
            Span::styled(" | ", Styles::title()),
            Span::styled(fit_cell("Company", COMPANY_WIDTH), Styles::title()),
            Span::styled(" | ", Styles::title()),
            Span::styled(fit_cell("Launch Date", DATE_WIDTH + 1), Styles::title()),
        ]);
        items.push(ListItem::new(header));

        for (i, row) in self.controller.rows().iter().enumerate() {
            let style = if Some(i) == self.table_state.selected() {
                Styles::selected()
            } else {
                Style::default()
            };

            let content = Line::from(vec![
                Span::styled(fit_cell(&row.id.to_string(), ID_WIDTH), style),
                Span::styled(" | ", style),
                Span::styled(fit_cell(&row.code, CODE_WIDTH), style),
                Span::styled(" | ", style),
                Span::styled(fit_cell(&row.name, NAME_WIDTH), style),
                Span::styled(" | ", style),
                Span::styled(fit_cell(&row.company, COMPANY_WIDTH), style),
                Span::styled(" | ", style),
                Span::styled(format_launch_date(&row.launch_date), style),
            ]);
            items.push(ListItem::new(content));
        }

        let title = if self.controller.rows().is_empty() {
            "Drugs (Empty)".to_string()
        } else {
            format!(
                "Drugs ({} of {} - Page {}/{}, {} per page)",
                self.controller.rows().len(),
                self.controller.total(),
                self.controller.query().page + 1,
                self.controller.page_count(),
                self.controller.query().page_size
            )
        };

        let list = List::new(items).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );

        f.render_widget(list, area);
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let (text, style) = match &self.status_message {
            Some(msg) => (format!("Status: {}", msg), Styles::success()),
            None => (
                "↑/↓: Row | ←/→: Page | s: Page size | f: Filter | c: Clear filter | \
                 Enter: Filter by row company | r: Refresh | q: Quit"
                    .to_string(),
                Styles::inactive(),
            ),
        };

        let status_bar = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(status_bar, area);
    }

    fn draw_company_dropdown(&mut self, f: &mut Frame, area: Rect) {
        let Some(dropdown) = self.company_dropdown.as_mut() else {
            return;
        };

        let popup_area = centered_rect(40, 60, area);
        f.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = dropdown
            .items
            .iter()
            .enumerate()
            .map(|(i, company)| {
                let style = if Some(i) == dropdown.selected_index() {
                    Styles::selected()
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(company.as_str(), style)))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title("Filter by Company")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected());

        f.render_stateful_widget(list, popup_area, &mut dropdown.state);
    }
}
