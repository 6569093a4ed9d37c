use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Display;
use std::marker::PhantomData;
use std::rc::Rc;
use std::str::FromStr;

use crate::api::capture::*;
use crate::model::Nargs;
use crate::prelude::Collectable;

struct Target<'a, V> {
    variable: &'a mut V,
    assigned: usize,
    has_errors: bool,
    flagged: bool,
}

/// Shared handle onto a caller variable plus its per-parse state.
struct Binding<'a, V> {
    id: ValueId,
    target: Rc<RefCell<Target<'a, V>>>,
}

impl<'a, V> Clone for Binding<'a, V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            target: self.target.clone(),
        }
    }
}

impl<'a, V> Binding<'a, V> {
    fn new(variable: &'a mut V) -> Self {
        Self {
            id: ValueId::mint(),
            target: Rc::new(RefCell::new(Target {
                variable,
                assigned: 0,
                has_errors: false,
                flagged: false,
            })),
        }
    }

    fn update(&self, f: impl FnOnce(&mut V)) {
        f(&mut *self.target.borrow_mut().variable);
    }

    fn assigned(&self) -> usize {
        self.target.borrow().assigned
    }

    fn has_errors(&self) -> bool {
        self.target.borrow().has_errors
    }

    fn note_assigned(&self) {
        self.target.borrow_mut().assigned += 1;
    }

    fn note_error(&self) {
        self.target.borrow_mut().has_errors = true;
    }

    /// `true` the first time it is called after a reset.
    fn flag_once(&self) -> bool {
        let mut target = self.target.borrow_mut();
        let first = !target.flagged;
        target.flagged = true;
        first
    }
}

impl<'a, V: Default> Binding<'a, V> {
    fn reset(&self) {
        let mut target = self.target.borrow_mut();
        *target.variable = V::default();
        target.assigned = 0;
        target.has_errors = false;
        target.flagged = false;
    }
}

fn convert<T>(token: &str) -> Result<T, InvalidCapture>
where
    T: FromStr,
    T::Err: Display,
{
    T::from_str(token).map_err(|error| InvalidCapture::InvalidConversion {
        token: token.to_string(),
        type_name: std::any::type_name::<T>(),
        message: error.to_string(),
    })
}

macro_rules! binding_accessors {
    () => {
        fn value_id(&self) -> ValueId {
            self.binding.id
        }

        fn reset(&mut self) {
            self.binding.reset();
        }

        fn assigned(&self) -> usize {
            self.binding.assigned()
        }

        fn note_assigned(&mut self) {
            self.binding.note_assigned();
        }

        fn note_error(&mut self) {
            self.binding.note_error();
        }
    };
}

/// A parameter that takes a single value (precisely 1).
///
/// Cloning a `Scalar` yields a field bound to the same variable, which allows several
/// options to alias one value.
pub struct Scalar<'a, T> {
    binding: Binding<'a, T>,
}

impl<'a, T> CliOption for Scalar<'a, T> {}
impl<'a, T> CliArgument for Scalar<'a, T> {}

impl<'a, T> Clone for Scalar<'a, T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<'a, T> Scalar<'a, T> {
    /// Create a scalar parameter.
    pub fn new(variable: &'a mut T) -> Self {
        Self {
            binding: Binding::new(variable),
        }
    }

    /// Whether a value failed to convert into this field during the last parse.
    pub fn has_errors(&self) -> bool {
        self.binding.has_errors()
    }
}

impl<'a, T> GenericCapturable<'a, T> for Scalar<'a, T>
where
    T: FromStr + Default,
    T::Err: Display,
{
    binding_accessors!();

    fn nargs(&self) -> Nargs {
        Nargs::Precisely(1)
    }

    fn convert(&self, token: &str) -> Result<T, InvalidCapture> {
        convert(token)
    }

    fn capture(&mut self, value: T) {
        self.binding.update(|variable| *variable = value);
    }

    fn capture_missing(&mut self, flag: Option<T>) {
        if let Some(value) = flag {
            self.capture(value);
        }
    }
}

/// An option parameter that takes no values (precisely 0), storing `target` when present.
pub struct Switch<'a, T> {
    binding: Binding<'a, T>,
    target: T,
}

impl<'a, T> CliOption for Switch<'a, T> {}

impl<'a, T: Clone> Clone for Switch<'a, T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            target: self.target.clone(),
        }
    }
}

impl<'a, T> Switch<'a, T> {
    /// Create a switch parameter.
    pub fn new(variable: &'a mut T, target: T) -> Self {
        Self {
            binding: Binding::new(variable),
            target,
        }
    }
}

impl<'a, T> GenericCapturable<'a, T> for Switch<'a, T>
where
    T: Clone + Default,
{
    binding_accessors!();

    fn nargs(&self) -> Nargs {
        Nargs::Precisely(0)
    }

    fn flag(&self) -> Option<T> {
        Some(self.target.clone())
    }

    fn convert(&self, token: &str) -> Result<T, InvalidCapture> {
        Err(InvalidCapture::NoValues {
            token: token.to_string(),
        })
    }

    fn capture(&mut self, value: T) {
        self.binding.update(|variable| *variable = value);
    }

    fn capture_missing(&mut self, flag: Option<T>) {
        if let Some(value) = flag {
            self.capture(value);
        }
    }
}

/// A parameter that maps down to [`Option`], taking a single value (precisely 1).
pub struct Optional<'a, T> {
    binding: Binding<'a, Option<T>>,
}

impl<'a, T> CliOption for Optional<'a, T> {}
impl<'a, T> CliArgument for Optional<'a, T> {}

impl<'a, T> Clone for Optional<'a, T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<'a, T> Optional<'a, T> {
    /// Create an optional parameter.
    pub fn new(variable: &'a mut Option<T>) -> Self {
        Self {
            binding: Binding::new(variable),
        }
    }
}

impl<'a, T> GenericCapturable<'a, T> for Optional<'a, T>
where
    T: FromStr,
    T::Err: Display,
{
    binding_accessors!();

    fn nargs(&self) -> Nargs {
        Nargs::Precisely(1)
    }

    fn convert(&self, token: &str) -> Result<T, InvalidCapture> {
        convert(token)
    }

    fn capture(&mut self, value: T) {
        self.binding.update(|variable| {
            variable.replace(value);
        });
    }

    fn capture_missing(&mut self, flag: Option<T>) {
        if let Some(value) = flag {
            self.capture(value);
        }
    }
}

/// A parameter that takes multiple values (specifiable [`Nargs`]).
pub struct Collection<'a, C, T> {
    binding: Binding<'a, C>,
    nargs: Nargs,
    _phantom: PhantomData<T>,
}

impl<'a, C, T> CliOption for Collection<'a, C, T> where C: 'a + Collectable<T> {}
impl<'a, C, T> CliArgument for Collection<'a, C, T> where C: 'a + Collectable<T> {}

impl<'a, C, T> Clone for Collection<'a, C, T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            nargs: self.nargs,
            _phantom: PhantomData,
        }
    }
}

impl<'a, C, T> Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    /// Create a collection parameter.
    pub fn new(variable: &'a mut C, nargs: Nargs) -> Self {
        Self {
            binding: Binding::new(variable),
            nargs,
            _phantom: PhantomData,
        }
    }
}

impl<'a, C, T> GenericCapturable<'a, T> for Collection<'a, C, T>
where
    T: FromStr,
    T::Err: Display,
    C: 'a + Collectable<T> + Default,
{
    binding_accessors!();

    fn nargs(&self) -> Nargs {
        self.nargs
    }

    fn convert(&self, token: &str) -> Result<T, InvalidCapture> {
        convert(token)
    }

    fn capture(&mut self, value: T) {
        self.binding.update(|variable| variable.add(value));
    }

    fn capture_missing(&mut self, flag: Option<T>) {
        // Repeated empty activations add the flag value only once.
        if let Some(value) = flag {
            if self.binding.flag_once() {
                self.capture(value);
            }
        }
    }
}

/// A collection parameter that maps down to [`Option`], distinguishing "never specified" from
/// "specified without values".
pub struct OptionalCollection<'a, C, T> {
    binding: Binding<'a, Option<C>>,
    nargs: Nargs,
    _phantom: PhantomData<T>,
}

impl<'a, C, T> CliOption for OptionalCollection<'a, C, T> where C: 'a + Collectable<T> {}

impl<'a, C, T> Clone for OptionalCollection<'a, C, T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            nargs: self.nargs,
            _phantom: PhantomData,
        }
    }
}

impl<'a, C, T> OptionalCollection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    /// Create an optional collection parameter.
    pub fn new(variable: &'a mut Option<C>, nargs: Nargs) -> Self {
        Self {
            binding: Binding::new(variable),
            nargs,
            _phantom: PhantomData,
        }
    }
}

impl<'a, C, T> GenericCapturable<'a, T> for OptionalCollection<'a, C, T>
where
    T: FromStr,
    T::Err: Display,
    C: 'a + Collectable<T> + Default,
{
    binding_accessors!();

    fn nargs(&self) -> Nargs {
        self.nargs
    }

    fn convert(&self, token: &str) -> Result<T, InvalidCapture> {
        convert(token)
    }

    fn capture(&mut self, value: T) {
        self.binding
            .update(|variable| variable.get_or_insert_with(C::default).add(value));
    }

    fn capture_missing(&mut self, _flag: Option<T>) {
        self.binding.update(|variable| {
            variable.get_or_insert_with(C::default);
        });
    }
}

/// An option parameter with no variable behind it; only its action observes it.
///
/// Typically paired with [`Parameter::action`](./struct.Parameter.html#method.action).
#[derive(Clone)]
pub struct Trigger {
    id: ValueId,
    assigned: Rc<RefCell<usize>>,
}

impl CliOption for Trigger {}

impl Default for Trigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Trigger {
    /// Create a trigger parameter.
    pub fn new() -> Self {
        Self {
            id: ValueId::mint(),
            assigned: Rc::new(RefCell::new(0)),
        }
    }
}

impl<'a> GenericCapturable<'a, ()> for Trigger {
    fn value_id(&self) -> ValueId {
        self.id
    }

    fn nargs(&self) -> Nargs {
        Nargs::Precisely(0)
    }

    fn flag(&self) -> Option<()> {
        Some(())
    }

    fn convert(&self, token: &str) -> Result<(), InvalidCapture> {
        Err(InvalidCapture::NoValues {
            token: token.to_string(),
        })
    }

    fn capture(&mut self, _value: ()) {}

    fn capture_missing(&mut self, _flag: Option<()>) {}

    fn reset(&mut self) {
        *self.assigned.borrow_mut() = 0;
    }

    fn assigned(&self) -> usize {
        *self.assigned.borrow()
    }

    fn note_assigned(&mut self) {
        *self.assigned.borrow_mut() += 1;
    }

    fn note_error(&mut self) {}
}

impl<T> Collectable<T> for Vec<T> {
    fn add(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: Eq + std::hash::Hash> Collectable<T> for HashSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec() {
        let mut collection: Vec<u32> = Vec::default();
        collection.add(1);
        collection.add(0);
        assert_eq!(collection, vec![1, 0]);
    }

    #[test]
    fn hash_set() {
        let mut collection: HashSet<u32> = HashSet::default();
        collection.add(1);
        collection.add(0);
        collection.add(1);
        assert_eq!(collection, HashSet::from([1, 0]));
    }

    #[test]
    fn scalar_capture() {
        let mut variable: u32 = u32::default();
        let mut scalar = Scalar::new(&mut variable);
        let value = scalar.convert("5").unwrap();
        scalar.capture(value);
        assert_eq!(variable, 5);
    }

    #[test]
    fn scalar_convert_error() {
        let mut variable: u32 = u32::default();
        let scalar = Scalar::new(&mut variable);
        assert_matches!(
            scalar.convert("five"),
            Err(InvalidCapture::InvalidConversion { token, type_name, .. }) => {
                assert_eq!(token, "five");
                assert_eq!(type_name, "u32");
            }
        );
    }

    #[test]
    fn scalar_aliased() {
        let mut variable: u32 = u32::default();
        let mut a = Scalar::new(&mut variable);
        let mut b = a.clone();
        assert_eq!(a.value_id(), b.value_id());

        a.note_assigned();
        a.capture(1);
        b.note_assigned();
        b.capture(2);
        assert_eq!(a.assigned(), 2);
        assert_eq!(b.assigned(), 2);
        drop(a);
        drop(b);
        assert_eq!(variable, 2);
    }

    #[test]
    fn scalar_reset() {
        let mut variable: u32 = 7;
        let mut scalar = Scalar::new(&mut variable);
        scalar.note_assigned();
        scalar.note_error();
        assert!(scalar.has_errors());

        scalar.reset();
        assert_eq!(scalar.assigned(), 0);
        assert!(!scalar.has_errors());
        assert_eq!(variable, 0);
    }

    #[test]
    fn switch_capture_missing() {
        let mut variable: u32 = u32::default();
        let mut switch = Switch::new(&mut variable, 2);
        let flag = switch.flag();
        switch.capture_missing(flag);
        assert_eq!(variable, 2);
    }

    #[test]
    fn switch_convert() {
        let mut variable: bool = false;
        let switch = Switch::new(&mut variable, true);
        assert_matches!(switch.convert("5"), Err(InvalidCapture::NoValues { .. }));
    }

    #[test]
    fn optional_capture() {
        let mut variable: Option<u32> = None;
        let mut optional = Optional::new(&mut variable);
        let value = optional.convert("1").unwrap();
        optional.capture(value);
        assert_eq!(variable, Some(1));
    }

    #[test]
    fn optional_capture_missing() {
        let mut variable: Option<u32> = None;
        let mut optional = Optional::new(&mut variable);
        optional.capture_missing(None);
        assert_eq!(variable, None);

        let mut variable: Option<u32> = None;
        let mut optional = Optional::new(&mut variable);
        optional.capture_missing(Some(3));
        assert_eq!(variable, Some(3));
    }

    #[test]
    fn collection_capture() {
        let mut variable: Vec<u32> = Vec::default();
        let mut collection = Collection::new(&mut variable, Nargs::Any);
        collection.capture(1);
        collection.capture(0);
        assert_eq!(variable, vec![1, 0]);

        let mut variable: HashSet<u32> = HashSet::default();
        let mut collection = Collection::new(&mut variable, Nargs::Any);
        collection.capture(1);
        collection.capture(0);
        collection.capture(0);
        assert_eq!(variable, HashSet::from([0, 1]));
    }

    #[test]
    fn collection_capture_missing_once() {
        let mut variable: Vec<u32> = Vec::default();
        let mut collection = Collection::new(&mut variable, Nargs::Any);
        collection.capture_missing(Some(9));
        collection.capture_missing(Some(9));
        collection.reset();
        collection.capture_missing(Some(8));
        assert_eq!(variable, vec![8]);
    }

    #[test]
    fn collection_capture_missing_without_flag() {
        let mut variable: Vec<u32> = vec![1];
        let mut collection = Collection::new(&mut variable, Nargs::Any);
        collection.capture_missing(None);
        assert_eq!(variable, vec![1]);
    }

    #[test]
    fn optional_collection() {
        let mut variable: Option<Vec<u32>> = None;
        let mut collection = OptionalCollection::new(&mut variable, Nargs::Any);
        collection.capture_missing(Some(1));
        assert_eq!(variable, Some(vec![]));

        let mut variable: Option<Vec<u32>> = None;
        let mut collection = OptionalCollection::new(&mut variable, Nargs::Any);
        collection.capture(4);
        collection.capture(5);
        assert_eq!(variable, Some(vec![4, 5]));
    }

    #[test]
    fn trigger() {
        let mut trigger = Trigger::new();
        let other = trigger.clone();
        trigger.note_assigned();
        assert_eq!(other.assigned(), 1);
        trigger.reset();
        assert_eq!(other.assigned(), 0);
        assert_matches!(trigger.convert("x"), Err(InvalidCapture::NoValues { .. }));
    }

    #[test]
    fn test_nargs() {
        let mut variable: u32 = u32::default();
        let scalar = Scalar::new(&mut variable);
        assert_eq!(scalar.nargs(), Nargs::Precisely(1));

        let mut variable: u32 = u32::default();
        let switch = Switch::new(&mut variable, 2);
        assert_eq!(switch.nargs(), Nargs::Precisely(0));

        let mut variable: Option<u32> = None;
        let optional = Optional::new(&mut variable);
        assert_eq!(optional.nargs(), Nargs::Precisely(1));

        let mut variable: Vec<u32> = Vec::default();
        let collection = Collection::new(&mut variable, Nargs::AtLeastOne);
        assert_eq!(collection.nargs(), Nargs::AtLeastOne);

        let mut variable: Option<Vec<u32>> = None;
        let collection = OptionalCollection::new(&mut variable, Nargs::Any);
        assert_eq!(collection.nargs(), Nargs::Any);

        assert_eq!(Trigger::new().nargs(), Nargs::Precisely(0));
    }
}
