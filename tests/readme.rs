#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::thread;

use sharedptr::SharedPtr;

mod leak;

struct Connection {
    name: &'static str,
}

impl Drop for Connection {
    fn drop(&mut self) {
        println!("closing connection {}", self.name);
    }
}

#[test]
fn readme() {
    leak::init();

    let conn = SharedPtr::new(Connection { name: "primary" });

    let workers = (0..4)
        .map(|id| {
            let conn = SharedPtr::clone(&conn);
            thread::spawn(move || format!("worker {id} using {}", conn.name))
        })
        .collect::<Vec<_>>();

    for worker in workers {
        println!("{}", worker.join().unwrap());
    }

    // All worker clones have been released.
    assert_eq!(SharedPtr::use_count(&conn), 1);

    let mut other = SharedPtr::clone(&conn);
    assert_eq!(SharedPtr::use_count(&conn), 2);
    SharedPtr::reset(&mut other);
    assert!(SharedPtr::is_empty(&other));
    assert_eq!(SharedPtr::use_count(&conn), 1);

    // prints "closing connection primary"
    drop(conn);
}
