use bolero::check;
use ferrule_queue::{bytes, value, Timeout};
use std::collections::VecDeque;

/// Queue operations replayed against a `VecDeque` model.
#[derive(Debug, Clone, Copy)]
enum Op {
    Push(u16),
    Pop,
    PopLatest,
    Flush,
}

impl Op {
    /// Pushes dominate so the ring actually fills.
    const fn decode(kind: u8, value: u16) -> Self {
        match kind % 8 {
            0..=3 => Self::Push(value),
            4 | 5 => Self::Pop,
            6 => Self::PopLatest,
            _ => Self::Flush,
        }
    }
}

#[test]
fn fuzz_value_queue_matches_model() {
    check!()
        .with_type::<(u8, Vec<(u8, u16)>)>()
        .for_each(|(cap, raw_ops)| {
            let capacity = u32::from(*cap % 8) + 1;
            let Ok((tx, mut rx)) = value::bounded::<u16>(capacity) else {
                panic!("non-zero capacity rejected");
            };
            let mut model = VecDeque::new();

            for &(kind, value) in raw_ops {
                match Op::decode(kind, value) {
                    Op::Push(v) => {
                        let accepted = tx.push(v).is_ok();
                        assert_eq!(accepted, model.len() < capacity as usize);
                        if accepted {
                            model.push_back(v);
                        }
                    }
                    Op::Pop => assert_eq!(rx.pop(Timeout::Poll), model.pop_front()),
                    Op::PopLatest => {
                        let expected = model.pop_back();
                        model.clear();
                        assert_eq!(rx.pop_latest(Timeout::Poll), expected);
                    }
                    Op::Flush => {
                        assert_eq!(rx.flush(), model.len());
                        model.clear();
                    }
                }
                assert_eq!(rx.len() as usize, model.len());
            }
        });
}

#[test]
fn fuzz_byte_queue_preserves_payloads() {
    check!()
        .with_type::<Vec<Vec<u8>>>()
        .for_each(|payloads| {
            let Ok((mut tx, mut rx)) = bytes::bounded(4, 32) else {
                panic!("valid sizes rejected");
            };

            for chunk in payloads.chunks(4) {
                let mut sent = Vec::new();
                for p in chunk {
                    let ok = tx.push(p);
                    assert_eq!(ok, !p.is_empty() && p.len() <= 32);
                    if ok {
                        sent.push(p);
                    }
                }
                for p in sent {
                    let Some(item) = rx.pop_begin(Timeout::Poll) else {
                        panic!("queued payload missing");
                    };
                    assert_eq!(&*item, p.as_slice());
                }
                assert!(rx.is_empty());
            }
        });
}
