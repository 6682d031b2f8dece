//! Application state

use ratatui::layout::{Position, Rect};
use turnstile_core::{
    FileStore, KioskController, LiveStatsDisplay, ReportBoard, SessionGate, SystemClock,
};

use crate::ui::components::toast::ToastSlot;

/// Which terminal this process is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Visitor check-in kiosk behind the staff login
    Kiosk,
    /// Report download panel
    Admin,
}

/// Current screen/view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Staff credential prompt
    Login,
    /// Check-in flow and live stats
    Kiosk,
    /// Report tiles
    Reports,
}

/// Field of the credential prompt with the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Id,
    Password,
}

/// Credential prompt input buffers
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub id: String,
    pub password: String,
    pub focus: LoginField,
}

impl LoginForm {
    /// Maximum characters accepted per field
    pub const MAX_LEN: usize = 64;

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Id => LoginField::Password,
            LoginField::Password => LoginField::Id,
        };
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Id => &mut self.id,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push(&mut self, c: char) {
        let field = self.focused_mut();
        if field.chars().count() < Self::MAX_LEN {
            field.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.focused_mut().pop();
    }

    /// Drop the password after a failed attempt, keeping the ID
    pub fn clear_password(&mut self) {
        self.password.clear();
        self.focus = LoginField::Password;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Clickable regions recorded by the last render
#[derive(Debug, Clone, Default)]
pub struct Hitboxes {
    pub logo: Option<Rect>,
    pub roles: Vec<Rect>,
    pub submit: Option<Rect>,
    pub tiles: Vec<Rect>,
    pub tile_buttons: Vec<(usize, Rect)>,
}

impl Hitboxes {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn on_logo(&self, column: u16, row: u16) -> bool {
        self.logo.is_some_and(|r| contains(r, column, row))
    }

    pub fn on_submit(&self, column: u16, row: u16) -> bool {
        self.submit.is_some_and(|r| contains(r, column, row))
    }

    pub fn role_at(&self, column: u16, row: u16) -> Option<usize> {
        self.roles.iter().position(|r| contains(*r, column, row))
    }

    pub fn tile_button_at(&self, column: u16, row: u16) -> Option<usize> {
        self.tile_buttons
            .iter()
            .find(|(_, r)| contains(*r, column, row))
            .map(|(i, _)| *i)
    }

    pub fn tile_at(&self, column: u16, row: u16) -> Option<usize> {
        self.tiles.iter().position(|r| contains(*r, column, row))
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    rect.contains(Position { x: column, y: row })
}

/// Application state
pub struct AppState {
    pub surface: Surface,

    /// Staff login gate in front of the kiosk
    pub gate: SessionGate<FileStore, SystemClock>,

    /// Credential prompt buffers
    pub login: LoginForm,

    /// Current check-in flow; replaced after every form submission
    pub kiosk: KioskController,

    pub stats: LiveStatsDisplay,

    pub board: ReportBoard,

    /// Highlighted report tile
    pub tile_index: usize,

    /// Result banner shown over every screen
    pub toast: ToastSlot,

    pub hitboxes: Hitboxes,

}

impl AppState {
    pub fn new(surface: Surface, store: FileStore, roles: Vec<String>) -> Self {
        let mut gate = SessionGate::new(store, SystemClock);
        if surface == Surface::Kiosk {
            gate.initialize();
        }

        Self {
            surface,
            gate,
            login: LoginForm::default(),
            kiosk: KioskController::new(roles),
            stats: LiveStatsDisplay::default(),
            board: ReportBoard::new(),
            tile_index: 0,
            toast: ToastSlot::default(),
            hitboxes: Hitboxes::default(),
        }
    }

    /// Screen to show right now
    pub fn screen(&self) -> Screen {
        match self.surface {
            Surface::Admin => Screen::Reports,
            Surface::Kiosk if self.gate.is_authenticated() => Screen::Kiosk,
            Surface::Kiosk => Screen::Login,
        }
    }

    /// Move the tile highlight, clamped to the board
    pub fn move_tile(&mut self, down: bool) {
        let last = self.board.tiles().len().saturating_sub(1);
        self.tile_index = if down {
            (self.tile_index + 1).min(last)
        } else {
            self.tile_index.saturating_sub(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state(surface: Surface, dir: &TempDir) -> AppState {
        let store = FileStore::new(dir.path().join("session.json"));
        AppState::new(surface, store, vec!["Student".into(), "Faculty".into()])
    }

    #[test]
    fn test_login_form_editing() {
        let mut form = LoginForm::default();
        form.push('a');
        form.push('b');
        form.toggle_focus();
        form.push('x');
        form.pop();
        form.push('y');

        assert_eq!(form.id, "ab");
        assert_eq!(form.password, "y");

        form.clear_password();
        assert_eq!(form.id, "ab");
        assert!(form.password.is_empty());
        assert_eq!(form.focus, LoginField::Password);
    }

    #[test]
    fn test_login_field_length_cap() {
        let mut form = LoginForm::default();
        for _ in 0..100 {
            form.push('z');
        }
        assert_eq!(form.id.len(), LoginForm::MAX_LEN);
    }

    #[test]
    fn test_hitboxes() {
        let mut boxes = Hitboxes {
            logo: Some(Rect::new(10, 5, 20, 4)),
            roles: vec![Rect::new(0, 10, 30, 1), Rect::new(0, 11, 30, 1)],
            ..Hitboxes::default()
        };

        assert!(boxes.on_logo(10, 5));
        assert!(boxes.on_logo(29, 8));
        assert!(!boxes.on_logo(30, 8));
        assert_eq!(boxes.role_at(3, 11), Some(1));
        assert_eq!(boxes.role_at(3, 12), None);
        assert!(!boxes.on_submit(0, 0));

        boxes.clear();
        assert!(!boxes.on_logo(10, 5));
    }

    #[test]
    fn test_screen_selection() {
        let dir = TempDir::new().unwrap();
        assert_eq!(state(Surface::Admin, &dir).screen(), Screen::Reports);
        assert_eq!(state(Surface::Kiosk, &dir).screen(), Screen::Login);
    }

    #[test]
    fn test_tile_highlight_is_clamped() {
        let dir = TempDir::new().unwrap();
        let mut state = state(Surface::Admin, &dir);

        state.move_tile(false);
        assert_eq!(state.tile_index, 0);
        for _ in 0..10 {
            state.move_tile(true);
        }
        assert_eq!(state.tile_index, 3);
    }
}
