//! The navigation menu as a value. The page owns a [`Menu`] and replaces it
//! with [`Menu::on`] for each user event; rendering reads [`Menu::is_open`]
//! and [`Menu::scroll_locked`].

/// User interactions that affect the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEvent {
    /// The menu button was pressed.
    Toggle,

    /// The dimmed area around the open menu was clicked.
    BackdropClick,

    /// Escape was pressed.
    Escape,

    /// A link inside the menu was followed.
    LinkClick,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Menu {
    open: bool,
}

impl Menu {
    pub fn is_open(self) -> bool {
        self.open
    }

    /// Page scrolling is disabled while the menu is open.
    pub fn scroll_locked(self) -> bool {
        self.open
    }

    /// The menu state after `event`.
    pub fn on(self, event: MenuEvent) -> Menu {
        match event {
            MenuEvent::Toggle => Menu { open: !self.open },
            MenuEvent::BackdropClick | MenuEvent::Escape | MenuEvent::LinkClick => {
                Menu { open: false }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_toggle() {
        let menu = Menu::default();
        assert!(!menu.is_open());
        let open = menu.on(MenuEvent::Toggle);
        assert!(open.is_open());
        assert!(open.scroll_locked());
        assert!(!open.on(MenuEvent::Toggle).is_open());
    }

    #[test]
    fn test_closing_events() {
        let open = Menu::default().on(MenuEvent::Toggle);
        for event in [MenuEvent::BackdropClick, MenuEvent::Escape, MenuEvent::LinkClick] {
            assert_eq!(open.on(event), Menu::default());
            assert_eq!(Menu::default().on(event), Menu::default());
        }
    }
}
