mod common;

use std::time::Duration;

use common::MiniStore;
use serde::{Deserialize, Serialize};
use tkv_template::{
    ClientError, DataType, Executed, Fallback, KeyOperations, KeyTtl, KvContext, OpError,
    SerializationError, StringOperation, StringSerializer, TkvError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Player {
    name: String,
    level: u32,
}

fn context(store: &MiniStore) -> KvContext {
    KvContext::init(store.config()).expect("init")
}

fn text_op(context: &KvContext, prefix: &str) -> StringOperation<String, String, StringSerializer> {
    StringOperation::new(prefix, context.template().clone())
}

fn key(text: &str) -> String {
    text.to_string()
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|word| word.to_string()).collect()
}

#[test]
fn set_then_get_round_trips_through_typed_json() {
    let store = MiniStore::start();
    let context = context(&store);
    let players: StringOperation<String, Player> = StringOperation::new("player", context.template().clone());
    let ana = Player {
        name: "ana".into(),
        level: 7,
    };

    let stored = players.set(&key("ana"), &ana).unwrap();
    assert!(matches!(stored, Executed::Value(true)));
    assert!(store.raw("player_ana").unwrap().starts_with(b"{\"@type\""));

    let fetched = players.get(&key("ana")).unwrap();
    assert_eq!(fetched.into_value(), Some(ana));

    let missing = players.get(&key("bob")).unwrap();
    assert!(matches!(missing.fallback(), Some(Fallback::NoResult)));
    assert_eq!(missing.into_value(), None);
}

#[test]
fn byte_values_are_stored_verbatim() {
    let store = MiniStore::start();
    let context = context(&store);
    let blobs: StringOperation<String, Vec<u8>> = StringOperation::new("blob", context.template().clone());
    let raw = vec![0u8, 255, 10, 13];

    assert!(blobs.set(&key("x"), &raw).unwrap().into_value());
    assert_eq!(store.raw("blob_x"), Some(raw.clone()));
    assert_eq!(blobs.get(&key("x")).unwrap().into_value(), Some(raw));
}

#[test]
fn incr_on_missing_key_starts_at_one() {
    let store = MiniStore::start();
    let context = context(&store);
    let counters = text_op(&context, "hits");

    assert_eq!(counters.incr(&key("home")).into_value(), 1);
    assert_eq!(counters.incr_by(&key("home"), 4).into_value(), 5);
    assert_eq!(counters.decr(&key("home")).into_value(), 4);
    assert_eq!(counters.decr_by(&key("home"), 2).into_value(), 2);
    assert_eq!(counters.get(&key("home")).unwrap().into_value(), Some("2".to_string()));
    assert_eq!(counters.incr_by_float(&key("home"), 0.5).unwrap().into_value(), 2.5);
}

#[test]
fn nan_float_increment_is_rejected_before_io() {
    let store = MiniStore::start();
    let context = context(&store);
    let counters = text_op(&context, "f");
    let sent = store.commands().len();

    let err = counters.incr_by_float(&key("x"), f64::NAN).unwrap_err();
    assert!(matches!(err, OpError::Argument(TkvError::InvalidArgument(_))));
    assert_eq!(store.commands().len(), sent);
    assert_eq!(store.raw("f_x"), None);
}

#[test]
fn failing_command_defaults_and_returns_the_connection() {
    let store = MiniStore::start();
    let mut config = store.config();
    config.pool.max_total = 1;
    config.pool.block_when_exhausted = false;
    let context = KvContext::init(config).expect("init");
    let counters = text_op(&context, "n");
    store.put_raw("n_word", b"abc");

    let failed = counters.incr(&key("word"));
    assert!(failed.is_defaulted());
    assert!(matches!(failed.error(), Some(ClientError::Server { .. })));
    assert_eq!(failed.into_value(), 0);

    // The only pooled session must be back, or this would be PoolExhausted.
    let stored = counters.set(&key("word"), &key("fine")).unwrap();
    assert!(matches!(stored, Executed::Value(true)));
    let pool = context.template().factory().pool().expect("pool");
    assert_eq!(pool.idle_count(), 1);
    assert_eq!(pool.total_count(), 1);
}

#[test]
fn conditional_sets() {
    let store = MiniStore::start();
    let context = context(&store);
    let names = text_op(&context, "name");

    assert!(names.set_if_absent(&key("a"), &key("first")).unwrap().into_value());
    assert!(!names.set_if_absent(&key("a"), &key("second")).unwrap().into_value());
    assert!(!names.set_if_present(&key("b"), &key("nope")).unwrap().into_value());
    assert_eq!(store.raw("name_b"), None);

    let updated = names
        .set_if_present_timeout(&key("a"), &key("third"), Duration::from_secs(60))
        .unwrap();
    assert!(updated.into_value());
    assert!(store
        .commands()
        .contains(&words(&["SET", "name_a", "third", "EX", "60", "XX"])));

    match names.ttl(&key("a")).into_value() {
        KeyTtl::ExpiresIn(left) => assert!(left <= Duration::from_secs(60) && left > Duration::ZERO),
        other => panic!("unexpected ttl {other:?}"),
    }

    assert!(names
        .set_if_absent_timeout(&key("c"), &key("short"), Duration::from_millis(1500))
        .unwrap()
        .into_value());
    assert!(store.commands().iter().any(|cmd| cmd.contains(&"PX".to_string()) && cmd.contains(&"1500".to_string())));
}

#[test]
fn expiring_writes_set_a_ttl() {
    let store = MiniStore::start();
    let context = context(&store);
    let names = text_op(&context, "tmp");

    assert!(names.set_ex(&key("s"), 30, &key("v")).unwrap().into_value());
    assert!(names.p_set_ex(&key("p"), 30_000, &key("v")).unwrap().into_value());
    assert!(names.set_timeout(&key("t"), &key("v"), Duration::from_secs(5)).unwrap().into_value());
    for name in ["s", "p", "t"] {
        assert!(matches!(names.p_ttl(&key(name)).into_value(), KeyTtl::ExpiresIn(_)));
    }
    assert_eq!(names.ttl(&key("missing")).into_value(), KeyTtl::Missing);
}

#[test]
fn multi_key_reads_and_writes() {
    let store = MiniStore::start();
    let context = context(&store);
    let names = text_op(&context, "m");

    let written = names
        .m_set(&[(key("a"), key("1")), (key("b"), key("2"))])
        .unwrap();
    assert!(written.into_value());

    let values = names.m_get(&[key("a"), key("zz"), key("b")]).unwrap().into_value();
    assert_eq!(values, vec![Some(key("1")), None, Some(key("2"))]);

    assert!(!names
        .m_set_if_absent(&[(key("b"), key("x")), (key("c"), key("y"))])
        .unwrap()
        .into_value());
    assert_eq!(store.raw("m_c"), None);
}

#[test]
fn empty_batches_send_nothing() {
    let store = MiniStore::start();
    let context = context(&store);
    let names = text_op(&context, "e");

    let read = names.m_get(&[]).unwrap();
    assert!(matches!(read, Executed::Value(ref values) if values.is_empty()));

    let written = names.m_set(&[]).unwrap();
    assert!(matches!(written.fallback(), Some(Fallback::NoResult)));
    assert!(!written.into_value());

    assert_eq!(store.count("MGET"), 0);
    assert_eq!(store.count("MSET"), 0);
}

#[test]
fn byte_level_string_commands() {
    let store = MiniStore::start();
    let context = context(&store);
    let text = text_op(&context, "txt");

    assert!(text.set(&key("k"), &key("hello")).unwrap().into_value());
    assert_eq!(text.append(&key("k"), &key(" world")).unwrap().into_value(), 11);
    assert_eq!(text.get_range(&key("k"), 0, 4).into_value(), "hello");
    assert_eq!(text.set_range(&key("k"), &key("WORLD"), 6).unwrap().into_value(), 11);
    assert_eq!(text.str_len(&key("k")).into_value(), 11);

    let previous = text.get_set(&key("k"), &key("new")).unwrap().into_value();
    assert_eq!(previous.as_deref(), Some("hello WORLD"));
    assert_eq!(text.get(&key("k")).unwrap().into_value().as_deref(), Some("new"));
}

#[test]
fn type_tag_mismatch_is_an_error_not_a_default() {
    let store = MiniStore::start();
    let context = context(&store);
    let numbers: StringOperation<String, u32> = StringOperation::new("shared", context.template().clone());
    let words: StringOperation<String, String> = StringOperation::new("shared", context.template().clone());

    assert!(numbers.set(&key("k"), &5).unwrap().into_value());
    let err = words.get(&key("k")).unwrap_err();
    assert!(matches!(
        err,
        OpError::Serialization(SerializationError::TypeMismatch { .. })
    ));
}

#[test]
fn key_operations_on_string_values() {
    let store = MiniStore::start();
    let context = context(&store);
    let names = text_op(&context, "key");

    assert!(!names.exists(&key("a")).into_value());
    assert_eq!(names.key_type(&key("a")).into_value(), DataType::None);

    names.set(&key("a"), &key("v")).unwrap();
    assert!(names.exists(&key("a")).into_value());
    assert_eq!(names.key_type(&key("a")).into_value(), DataType::String);
    assert_eq!(names.ttl(&key("a")).into_value(), KeyTtl::NoExpiry);

    assert!(names.expire(&key("a"), 100).into_value());
    assert!(matches!(names.ttl(&key("a")).into_value(), KeyTtl::ExpiresIn(_)));
    assert!(names.persist(&key("a")).into_value());
    assert_eq!(names.p_ttl(&key("a")).into_value(), KeyTtl::NoExpiry);

    assert!(names.p_expire(&key("a"), 100_000).into_value());
    assert_eq!(names.random_key().into_value().as_deref(), Some("key_a"));

    assert!(names.del(&key("a")).into_value());
    assert!(!names.del(&key("a")).into_value());
    assert!(!names.expire(&key("a"), 5).into_value());
}
