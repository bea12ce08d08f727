//! Session-level UI state: sign-in, the side menu and the chat list pager.

use suhbat_api::{ChatSummary, UserInfo};

/// Chats revealed per page of the conversation list
pub const CHATS_PER_PAGE: usize = 10;

/// Side menu visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    /// Open the menu. Returns `true` if it was closed.
    pub fn open(&mut self) -> bool {
        let changed = *self == MenuState::Closed;
        *self = MenuState::Open;
        changed
    }

    /// Close the menu. Returns `true` if it was open.
    pub fn close(&mut self) -> bool {
        let changed = *self == MenuState::Open;
        *self = MenuState::Closed;
        changed
    }

    pub fn toggle(&mut self) {
        *self = match self {
            MenuState::Closed => MenuState::Open,
            MenuState::Open => MenuState::Closed,
        };
    }

    pub fn is_open(&self) -> bool {
        *self == MenuState::Open
    }
}

/// Reveals the conversation list one page at a time
#[derive(Debug, Clone)]
pub struct ChatPager {
    chats: Vec<ChatSummary>,
    page_size: usize,
    visible: usize,
}

impl Default for ChatPager {
    fn default() -> Self {
        Self::new(CHATS_PER_PAGE)
    }
}

impl ChatPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            chats: Vec::new(),
            page_size: page_size.max(1),
            visible: 0,
        }
    }

    /// Replace the list and show its first page
    pub fn set_chats(&mut self, chats: Vec<ChatSummary>) {
        self.visible = chats.len().min(self.page_size);
        self.chats = chats;
    }

    /// Chats shown so far
    pub fn visible(&self) -> &[ChatSummary] {
        &self.chats[..self.visible]
    }

    /// Reveal the next page, returning only the newly shown chats
    pub fn load_more(&mut self) -> &[ChatSummary] {
        let start = self.visible;
        self.visible = (start + self.page_size).min(self.chats.len());
        &self.chats[start..self.visible]
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.chats.len()
    }

    /// 1-based number of the last page shown; zero when nothing is shown
    pub fn page(&self) -> usize {
        self.visible.div_ceil(self.page_size)
    }

    pub fn total(&self) -> usize {
        self.chats.len()
    }

    /// Collapse back to the first page
    pub fn reset(&mut self) {
        self.visible = self.chats.len().min(self.page_size);
    }

    pub fn clear(&mut self) {
        self.chats.clear();
        self.visible = 0;
    }
}

/// Everything the front end shows outside the transcript
#[derive(Debug, Clone, Default)]
pub struct AppState {
    logged_in: bool,
    user: Option<UserInfo>,
    menu: MenuState,
    chats: ChatPager,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    /// Record a successful sign-in
    pub fn sign_in(&mut self, user: Option<UserInfo>) {
        self.logged_in = true;
        self.user = user;
    }

    /// Forget the user and everything loaded on their behalf
    pub fn sign_out(&mut self) {
        self.logged_in = false;
        self.user = None;
        self.menu.close();
        self.chats.clear();
    }

    pub fn menu(&self) -> MenuState {
        self.menu
    }

    /// Open the menu, starting the chat list from its first page
    pub fn open_menu(&mut self) -> bool {
        self.chats.reset();
        self.menu.open()
    }

    pub fn close_menu(&mut self) -> bool {
        self.menu.close()
    }

    pub fn toggle_menu(&mut self) {
        if self.menu.is_open() {
            self.close_menu();
        } else {
            self.open_menu();
        }
    }

    pub fn chats(&self) -> &ChatPager {
        &self.chats
    }

    /// Replace the conversation list, showing its first page
    pub fn set_chats(&mut self, chats: Vec<ChatSummary>) {
        self.chats.set_chats(chats);
    }

    /// Reveal the next page of conversations, returning only the new ones
    pub fn load_more_chats(&mut self) -> &[ChatSummary] {
        self.chats.load_more()
    }
}
