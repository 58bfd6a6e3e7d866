#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use sharedptr::SharedPtr;

mod leak;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Student {
    name: String,
    group: String,
}

impl Student {
    fn new(name: &str, group: &str) -> Self {
        Self {
            name: name.to_owned(),
            group: group.to_owned(),
        }
    }
}

#[test]
fn copy_move() {
    leak::init();
    let drops = leak::Drops::new();

    let mut ptr = SharedPtr::new(drops.track(Student::new("Dmitry", "IU8-31")));
    // copy
    let ptr1 = SharedPtr::clone(&ptr);
    let mut ptr3 = SharedPtr::<leak::Tracked<Student>>::empty();
    // copy assignment
    ptr3.clone_from(&ptr);
    assert_eq!(SharedPtr::use_count(&ptr), 3);
    // move
    let mut ptr4 = SharedPtr::take(&mut ptr);
    assert!(SharedPtr::is_empty(&ptr));
    assert_eq!(SharedPtr::use_count(&ptr4), 3);
    // move assignment
    SharedPtr::assign(&mut ptr3, &mut ptr4);
    assert!(SharedPtr::is_empty(&ptr4));
    assert_eq!(SharedPtr::use_count(&ptr3), 2);

    drop(ptr1);
    assert_eq!(drops.count(), 0);
    drop(ptr3);
    assert_eq!(drops.count(), 1);
    drop(ptr);
    drop(ptr4);
    assert_eq!(drops.count(), 1);
}

#[test]
fn use_count() {
    leak::init();

    let mut ptr = SharedPtr::new(Student::new("Dmitry", "IU8-31"));
    let mut ptr1 = SharedPtr::clone(&ptr);
    // two smart pointers
    assert_eq!(SharedPtr::use_count(&ptr), 2);
    SharedPtr::reset(&mut ptr);
    // should be only one
    assert_eq!(SharedPtr::use_count(&ptr1), 1);
    let tmp = SharedPtr::take(&mut ptr1);
    // nothing ever changed because of move
    assert_eq!(SharedPtr::use_count(&tmp), 1);
    assert_eq!(SharedPtr::use_count(&ptr1), 0);
}

#[test]
fn operators() {
    leak::init();

    let ptr = SharedPtr::new(Student::new("Dmitry", "IU8-31"));
    assert!(SharedPtr::is_owning(&ptr));
    let s = Student::clone(&ptr);
    assert_eq!(s.name, "Dmitry");
    assert_eq!(s.group, "IU8-31");

    assert_eq!(ptr.name, "Dmitry");
    assert_eq!(ptr.group, "IU8-31");

    let raw = SharedPtr::as_ptr(&ptr);
    let raw = unsafe { &*raw };
    assert_eq!(raw.name, "Dmitry");
    assert_eq!(raw.group, "IU8-31");
}

#[test]
fn reset_releases_before_last_owner() {
    leak::init();
    let drops = leak::Drops::new();

    let mut a = SharedPtr::new(drops.track(Student::new("Ada", "IU8-11")));
    let b = SharedPtr::clone(&a);
    SharedPtr::reset_with(&mut a, Box::new(drops.track(Student::new("Alan", "IU8-12"))));
    assert_eq!(drops.count(), 0);
    assert_eq!(a.value.name, "Alan");
    assert_eq!(b.value.name, "Ada");

    drop(b);
    assert_eq!(drops.count(), 1);
    SharedPtr::reset(&mut a);
    assert_eq!(drops.count(), 2);
}

#[test]
#[should_panic(expected = "dereferenced an empty SharedPtr")]
fn member_access_on_default_panics() {
    let ptr = SharedPtr::<Student>::default();
    let _name = &ptr.name;
}
