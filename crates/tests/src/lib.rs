//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约测试
//! - Source -> Dispatcher -> Sink 端到端流程（暂停时钟，精确校验退避时间）

#[cfg(test)]
mod contract_tests {
    use contracts::{Address, SendResult};

    #[test]
    fn test_contracts_compile() {
        assert_eq!(Address::new("dc", "node").to_string(), "dc/node");
        assert!(SendResult::Accepted.is_accepted());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{Address, Event, Payload, SendResult};
    use dispatcher::{
        CancellationToken, ChannelSource, Dispatcher, DispatcherState, JsonLinesSource, LogSink,
        MockSink, MockSource,
    };
    use tokio::time::Instant;

    const BACKOFF: Duration = Duration::from_millis(100);

    fn addr(node: &str) -> Address {
        Address::new("dc1", node)
    }

    /// Source yields ({A1,A2,A3}, P); sink answers Accepted, Rejected, Accepted.
    ///
    /// Expected: A1 and A2 immediately, 100ms pause, A3, then the next event is read.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_reject_in_middle_of_fanout() {
        let (tx, source) = ChannelSource::channel("upstream", 8);
        let sink = MockSink::new("downstream").with_outcomes([
            SendResult::Accepted,
            SendResult::Rejected,
            SendResult::Accepted,
        ]);
        let log = sink.log();
        let cancel = CancellationToken::new();

        let handle = Dispatcher::new(source, sink, BACKOFF).spawn(cancel.clone());
        let started = Instant::now();

        let payload = Payload::new("billing", vec![0xde, 0xad]);
        tx.send(Event::new(vec![addr("a1"), addr("a2"), addr("a3")], payload.clone()))
            .await
            .unwrap();
        log.wait_for(3).await;

        // The loop asks for the next event right after A3
        tx.send(Event::new(vec![addr("b1")], payload)).await.unwrap();
        log.wait_for(4).await;

        cancel.cancel();
        let stats = handle.await.unwrap();

        let trace: Vec<_> = log
            .records()
            .into_iter()
            .map(|r| (r.address.node_id, r.outcome, r.at - started))
            .collect();
        assert_eq!(
            trace,
            vec![
                ("a1".to_string(), SendResult::Accepted, Duration::ZERO),
                ("a2".to_string(), SendResult::Rejected, Duration::ZERO),
                ("a3".to_string(), SendResult::Accepted, BACKOFF),
                ("b1".to_string(), SendResult::Accepted, BACKOFF),
            ]
        );
        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.backoffs, 1);
    }

    /// Event file -> Dispatcher -> MockSink, with one malformed line
    #[tokio::test(start_paused = true)]
    async fn test_e2e_json_lines_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"recipients":[{{"data_center":"dc1","node_id":"n1"}},{{"data_center":"dc1","node_id":"n1"}}],"payload":{{"origin":"first","data":[1]}}}}"#
        )
        .unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(
            file,
            r#"{{"recipients":[{{"data_center":"dc2","node_id":"n2"}}],"payload":{{"origin":"second","data":[2]}}}}"#
        )
        .unwrap();

        let source = JsonLinesSource::open(file.path()).await.unwrap();
        let sink = MockSink::new("downstream");
        let log = sink.log();
        let cancel = CancellationToken::new();

        let handle = Dispatcher::new(source, sink, BACKOFF).spawn(cancel.clone());
        log.wait_for(3).await;
        cancel.cancel();
        let stats = handle.await.unwrap();

        let delivered: Vec<_> = log
            .records()
            .into_iter()
            .map(|r| (r.origin, r.address.to_string()))
            .collect();
        // Duplicate recipients are delivered independently
        assert_eq!(
            delivered,
            vec![
                ("first".to_string(), "dc1/n1".to_string()),
                ("first".to_string(), "dc1/n1".to_string()),
                ("second".to_string(), "dc2/n2".to_string()),
            ]
        );
        assert_eq!(stats.source_faults, 1);
        assert_eq!(stats.cycles, 2);
    }

    /// Two dispatchers sharing one sink
    #[tokio::test(start_paused = true)]
    async fn test_e2e_shared_sink() {
        let sink = Arc::new(MockSink::new("shared"));
        let log = sink.log();
        let cancel = CancellationToken::new();

        let (tx_a, source_a) = ChannelSource::channel("a", 4);
        let (tx_b, source_b) = ChannelSource::channel("b", 4);
        let handle_a = Dispatcher::new(source_a, Arc::clone(&sink), BACKOFF).spawn(cancel.clone());
        let handle_b = Dispatcher::new(source_b, Arc::clone(&sink), BACKOFF).spawn(cancel.clone());

        tx_a.send(Event::new(vec![addr("x")], Payload::new("a", vec![])))
            .await
            .unwrap();
        tx_b.send(Event::new(vec![addr("y")], Payload::new("b", vec![])))
            .await
            .unwrap();
        log.wait_for(2).await;

        cancel.cancel();
        assert_eq!(handle_a.await.unwrap().deliveries, 1);
        assert_eq!(handle_b.await.unwrap().deliveries, 1);
    }

    /// Stop requested from several places at once
    #[tokio::test(start_paused = true)]
    async fn test_e2e_repeated_stop() {
        let source = MockSource::demo();
        let mut dispatcher = Dispatcher::new(source, LogSink::new("log"), BACKOFF);
        let cancel = CancellationToken::new();

        let stoppers: Vec<_> = (0..3)
            .map(|_| {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(3500)).await;
                    cancel.cancel();
                })
            })
            .collect();

        dispatcher.run(&cancel).await;
        for stopper in stoppers {
            stopper.await.unwrap();
        }
        cancel.cancel();

        assert_eq!(dispatcher.state(), DispatcherState::Stopped);
        assert_eq!(dispatcher.stats().cycles, 3);
        assert_eq!(dispatcher.stats().deliveries, 3);
    }

    /// Rejecting sink never stops the loop; it just slows it down
    #[tokio::test(start_paused = true)]
    async fn test_e2e_always_rejecting_sink() {
        let source = MockSource::demo().with_interval(Duration::from_millis(10));
        let sink = MockSink::new("refuser").with_reject_every(1);
        let log = sink.log();
        let cancel = CancellationToken::new();

        let handle = Dispatcher::new(source, sink, BACKOFF).spawn(cancel.clone());
        log.wait_for(5).await;
        cancel.cancel();
        let stats = handle.await.unwrap();

        let records = log.records();
        for pair in records.windows(2) {
            // read interval + backoff between consecutive deliveries
            assert_eq!(pair[1].at - pair[0].at, BACKOFF + Duration::from_millis(10));
        }
        assert_eq!(stats.accepted, 0);
        assert_eq!(stats.rejected, stats.backoffs);
    }
}
