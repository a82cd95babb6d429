//! Drop-tracking values for testing that containers release everything they own.
use std::cell::Cell;
use std::ops::Deref;
use std::rc::Rc;

/// Increments the shared counter every time an instance is dropped.
#[derive(Debug, Clone)]
pub struct CountedDrop(pub Rc<Cell<usize>>);

impl CountedDrop {
    pub fn new(counter: &Rc<Cell<usize>>) -> CountedDrop {
        CountedDrop(Rc::clone(counter))
    }

    pub fn counter() -> Rc<Cell<usize>> {
        Rc::new(Cell::new(0))
    }
}

impl Deref for CountedDrop {
    type Target = Rc<Cell<usize>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Drop for CountedDrop {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}
