// Each test target only uses some of these helpers.
#![allow(dead_code)]

use docpane::{
    error::Result,
    nav::{ContentPane, ViewportObserver},
    viewer::Clipboard,
};
use std::{cell::RefCell, env, path::PathBuf, rc::Rc};

pub fn test_dir() -> PathBuf {
    env::current_dir()
        .expect("Unable to get working directory")
        .join("data")
}

/// Records every anchor it was asked to scroll to.
#[derive(Clone, Default)]
pub struct TestPane(Rc<RefCell<Vec<String>>>);

impl TestPane {
    pub fn scrolls(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl ContentPane for TestPane {
    fn scroll_into_view(&mut self, anchor: &str) {
        self.0.borrow_mut().push(String::from(anchor));
    }
}

/// Tracks which anchors are currently observed.
#[derive(Clone, Default)]
pub struct TestObserver(Rc<RefCell<Vec<String>>>);

impl TestObserver {
    pub fn observed(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

impl ViewportObserver for TestObserver {
    fn observe(&mut self, anchor: &str) {
        self.0.borrow_mut().push(String::from(anchor));
    }

    fn unobserve(&mut self, anchor: &str) {
        self.0.borrow_mut().retain(|observed| observed != anchor);
    }
}

#[derive(Clone, Default)]
pub struct TestClipboard {
    contents: Rc<RefCell<Option<String>>>,
    denied: bool,
}

impl TestClipboard {
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Default::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Clipboard for TestClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.denied {
            return Err(docpane::error::Error::msg("clipboard access denied"));
        }

        *self.contents.borrow_mut() = Some(String::from(text));
        Ok(())
    }
}
