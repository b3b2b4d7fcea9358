//! Release policies invoked when the last slot referencing an entity goes away.
//!
//! A store is built with one `Liberator`; it is called exactly once per
//! entity, with the value moved out of the box, at the moment the
//! entity's reference count reaches zero.


/// Strategy for releasing whatever a stored value denotes.
pub trait Liberator<T> {
    fn release(&mut self, value: T);
}


/// For values that own nothing beyond their own memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLiberator;

impl<T> Liberator<T> for NoopLiberator {
    fn release(&mut self, _value: T) {}
}


/// For owning pointers (`Box<U>`, `Vec<U>`, ...): destroys the pointee and
/// everything it owns, recursively.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropLiberator;

impl<T> Liberator<T> for DropLiberator {
    fn release(&mut self, value: T) {
        drop(value);
    }
}


/// A value with an explicit teardown step, typically an enum of resource
/// handles where each variant frees its resource differently.
pub trait Release {
    fn release(self);
}

/// Dispatches to the value's `Release` impl.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseLiberator;

impl<T: Release> Liberator<T> for ReleaseLiberator {
    fn release(&mut self, value: T) {
        value.release();
    }
}


impl<T, F: FnMut(T)> Liberator<T> for F {
    fn release(&mut self, value: T) {
        self(value)
    }
}
