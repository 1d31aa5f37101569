use super::*;
use crate::HeapPointer;
use pretty_assertions::assert_eq;

fn num(value: i64) -> Var {
    Var::make(Numeric::Integer(value))
}

#[test]
fn string_concatenation_and_ordering() {
    let a = Var::make(String::from("foo"));
    let b = Var::make(String::from("bar"));
    assert_eq!(a.add(&b).ok(), Some(Var::make(String::from("foobar"))));
    assert_eq!(a.abocmp(&b).ok(), Some(true));
    assert_eq!(
        a.index(&num(1)).map(VarBorrower::into_owned).ok(),
        Some(Var::make('o'))
    );
}

#[test]
fn array_index_reads_and_writes_in_place() {
    let mut array = Var::make(Array::from([num(1), num(2), num(3)]));
    {
        let mut slot = array.index_mut(&num(1)).ok();
        let target = slot.as_mut().and_then(VarBorrower::data);
        if let Some(target) = target {
            *target = num(20);
        }
    }
    let read = array.index(&num(1)).map(VarBorrower::into_owned).ok();
    assert_eq!(read, Some(num(20)));
    assert_eq!(array.to_string(), "{1, 20, 3}");
}

#[test]
fn array_index_out_of_range() {
    let array = Var::make(FwdArray::from([num(1)]));
    let err = array.index(&num(5)).err().map(|e| e.what());
    assert_eq!(err.as_deref(), Some("Out of range."));
    assert!(array.index(&num(-1)).is_err());
}

#[test]
fn hash_map_auto_inserts_on_write() {
    let mut map = Var::make(HashMap::default());
    assert!(map.index(&num(1)).is_err());
    {
        let mut slot = map.index_mut(&num(1)).ok();
        if let Some(target) = slot.as_mut().and_then(VarBorrower::data) {
            *target = Var::make(String::from("one"));
        }
    }
    let read = map.index(&num(1)).map(VarBorrower::into_owned).ok();
    assert_eq!(read, Some(Var::make(String::from("one"))));
}

#[test]
fn hash_map_rejects_unhashable_keys() {
    let mut map = Var::make(HashMap::default());
    let key = Var::make(List::new());
    let err = map.index_mut(&key).err();
    assert!(err.is_some_and(|e| e.is_lang_error()));
}

#[test]
fn pair_members() {
    let pair = Var::make::<Pair>((num(1), num(2)));
    let second = pair.access("second").map(VarBorrower::into_owned).ok();
    assert_eq!(second, Some(num(2)));
    assert!(pair.access("third").is_err());
    assert_eq!(pair.to_string(), "(1: 2)");
}

#[test]
fn callable_invocation() {
    let double = Var::make(Callable::new(|args| {
        let value = args.first().cloned().unwrap_or_default();
        value.add(&value)
    }));
    let mut args = [num(21)];
    assert_eq!(double.call(&mut args).ok(), Some(num(42)));
    assert!(num(1).call(&mut []).is_err());
}

#[test]
fn containers_mark_their_elements() {
    let target = HeapPointer::new(num(1));
    let nested = Var::make(Array::from([Var::make(FwdArray::from([Var::make(
        target.clone(),
    )]))]));
    nested.mark_reachable();
    assert_eq!(target.reachable_count(), 1);

    let pair = Var::make::<Pair>((Var::make(target.clone()), Var::null()));
    pair.mark_reachable();
    assert_eq!(target.reachable_count(), 2);
}

#[test]
fn booleans_and_chars() {
    assert_eq!(Var::make(true).to_integer(), Ok(1));
    assert_eq!(Var::make('A').to_integer(), Ok(65));
    assert_eq!(Var::make(false).to_string(), "false");
}
