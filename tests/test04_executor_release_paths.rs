//! The execution wrapper releases its checkout on every exit path: normal
//! return, error return, and unwinding panic.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use sql_pool::pool::{ConnectionPool, PoolConfig};
use sql_pool::test_utils::TestConnector;
use sql_pool::{Database, SqlPoolError};

fn database() -> (Database<TestConnector>, TestConnector) {
    let connector = TestConnector::new();
    let config = PoolConfig::new(1).with_reaping_frequency_secs(0);
    let pool = Arc::new(ConnectionPool::new(config, connector.clone()).expect("valid config"));
    (Database::new(pool), connector)
}

#[test]
fn work_runs_with_a_pooled_connection() {
    let (db, _connector) = database();
    let serial = db.execute(|conn| Ok(conn.serial())).expect("work succeeds");
    assert_eq!(serial, 0);
    assert_eq!(db.pool().stats().idle, 1, "released after normal return");
}

#[test]
fn failing_work_propagates_and_still_releases() {
    let (db, _connector) = database();
    let err = db
        .execute(|_conn| Err::<(), _>(SqlPoolError::ExecutionError("duplicate key".into())))
        .err()
        .expect("work error propagates");
    assert!(matches!(err, SqlPoolError::ExecutionError(_)));
    assert_eq!(db.pool().stats().idle, 1, "released after error return");
}

#[test]
fn panicking_work_still_releases() {
    let (db, _connector) = database();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        db.execute(|_conn| -> Result<(), SqlPoolError> { panic!("boom") })
    }));
    assert!(result.is_err());
    assert_eq!(db.pool().stats().idle, 1, "released during unwind");

    // The pool stays usable with the same connection afterwards.
    let serial = db
        .execute(|conn| Ok(conn.serial()))
        .expect("pool healthy after panic");
    assert_eq!(serial, 0);
}

#[test]
fn nested_execute_reuses_the_thread_connection() {
    let (db, connector) = database();
    db.execute(|outer| {
        let outer_serial = outer.serial();
        db.execute(|inner| {
            assert_eq!(inner.serial(), outer_serial);
            Ok(())
        })
    })
    .expect("nested execute");
    assert_eq!(connector.created(), 1);
    assert_eq!(db.pool().stats().idle, 1);
}
