//! Ordered, tagged field lists — the generic display surface the
//! inspectors expose to any consumer (CLI, JSON report, ...).
//!
//! Each field has a stable tag (`board.name`, `cpu.desc`, ...), a
//! display name, a cached value, and optionally a getter closure.
//! A field marked live re-runs its getter on every read (current
//! clock frequency, temperature); static fields keep the value
//! captured when they were inserted.

use std::cell::RefCell;
use std::rc::Rc;

/// Getter closures borrow their owning inspector, so a `FieldList`
/// cannot outlive the inspector it was built from.
pub type Getter<'a> = Rc<dyn Fn() -> Option<String> + 'a>;

pub struct Field<'a> {
    tag: String,
    name: String,
    live: bool,
    value: RefCell<Option<String>>,
    getter: Option<Getter<'a>>,
}

impl<'a> Field<'a> {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Current value, re-running the getter first if the field is
    /// live (or was never evaluated).
    pub fn value(&self) -> Option<String> {
        if let Some(get) = &self.getter {
            let mut cached = self.value.borrow_mut();
            if self.live || cached.is_none() {
                *cached = get();
            }
            return cached.clone();
        }
        self.value.borrow().clone()
    }
}

/// Ordered sequence of fields with unique tags.
#[derive(Default)]
pub struct FieldList<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> FieldList<'a> {
    pub fn new() -> Self {
        FieldList::default()
    }

    /// Inserts a field, or updates the existing field with the same
    /// tag in place, preserving its position in the list. The getter
    /// is evaluated once immediately so static fields have a value.
    pub fn upsert(&mut self, tag: &str, live: bool, name: &str, getter: Getter<'a>) {
        let value = RefCell::new(getter());
        let field = Field {
            tag: tag.to_string(),
            name: name.to_string(),
            live,
            value,
            getter: Some(getter),
        };
        self.put(field);
    }

    /// Inserts or updates a fixed-value field with no getter.
    pub fn upsert_static(&mut self, tag: &str, name: &str, value: impl Into<String>) {
        self.put(Field {
            tag: tag.to_string(),
            name: name.to_string(),
            live: false,
            value: RefCell::new(Some(value.into())),
            getter: None,
        });
    }

    fn put(&mut self, field: Field<'a>) {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.tag == field.tag) {
            *existing = field;
        } else {
            self.fields.push(field);
        }
    }

    /// Value lookup by tag, refreshing live fields.
    pub fn get(&self, tag: &str) -> Option<String> {
        self.fields.iter().find(|f| f.tag == tag)?.value()
    }

    pub fn is_live(&self, tag: &str) -> bool {
        self.fields.iter().any(|f| f.tag == tag && f.live)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field<'a>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Independent copy of `self` with `tail`'s fields appended, for
    /// building one composite list (board fields + CPU fields). Getter
    /// closures are shared by reference; the inspectors both lists
    /// borrow from must outlive the result.
    pub fn copy_and_chain(&self, tail: &FieldList<'a>) -> FieldList<'a> {
        let mut out = FieldList::new();
        for f in self.fields.iter().chain(tail.fields.iter()) {
            out.put(Field {
                tag: f.tag.clone(),
                name: f.name.clone(),
                live: f.live,
                value: RefCell::new(f.value.borrow().clone()),
                getter: f.getter.clone(),
            });
        }
        out
    }
}
