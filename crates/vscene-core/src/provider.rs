//! The external collaborator contract (§6): something that can enumerate pages and
//! yield each page's operator stream. The real PDF-like provider is out of scope
//! here; `vscene-cli` supplies a small textual-format implementation for `build` and
//! test harnesses supply in-memory ones.

use crate::interp::operator::Operator;

/// A page's lazily-available operator sequence. Per §9, operator sequences are
/// non-restartable: callers consume a page's operators once.
pub trait OperatorSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn page_count(&self) -> Result<usize, Self::Error>;

    /// The page's nominal bounds in page space, `(x0, y0, x1, y1)`, used to seed the
    /// CTM and initial clip before any operators run.
    fn page_bounds(&self, page_index: usize) -> Result<(f64, f64, f64, f64), Self::Error>;

    /// Returns the full decoded operator sequence for one page.
    fn page_operators(&self, page_index: usize) -> Result<Vec<Operator>, Self::Error>;
}

/// An in-memory [`OperatorSource`], usable from tests and from the CLI's textual
/// format loader without a trait object indirection.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    pub pages: Vec<(f64, f64, f64, f64)>,
    pub operators: Vec<Vec<Operator>>,
}

impl InMemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&mut self, bounds: (f64, f64, f64, f64), ops: Vec<Operator>) {
        self.pages.push(bounds);
        self.operators.push(ops);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("page index out of range")]
pub struct InMemorySourceError;

impl OperatorSource for InMemorySource {
    type Error = InMemorySourceError;

    fn page_count(&self) -> Result<usize, Self::Error> {
        Ok(self.pages.len())
    }

    fn page_bounds(&self, page_index: usize) -> Result<(f64, f64, f64, f64), Self::Error> {
        self.pages.get(page_index).copied().ok_or(InMemorySourceError)
    }

    fn page_operators(&self, page_index: usize) -> Result<Vec<Operator>, Self::Error> {
        self.operators.get(page_index).cloned().ok_or(InMemorySourceError)
    }
}
