#[cfg(test)]
mod tests {
    use super::super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_stdout_sink_receives_line_then_closes() {
        let (tx, mut rx) = mpsc::channel(8);
        let command = ProcessCommandBuilder::new("echo")
            .arg("Hello George")
            .stdout(tx)
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();

        let line = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("line within timeout")
            .expect("one line before close");
        assert_eq!(line, "Hello George");

        // The sink must close right after end of stream, without blocking.
        let closed = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("closure within timeout");
        assert_eq!(closed, None);

        // A second read of a closed sink reports closure again, immediately.
        assert_eq!(rx.recv().await, None);

        let status = handle.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_echo_without_sinks_completes() {
        let command = ProcessCommandBuilder::new("echo")
            .arg("straight to the parent stream")
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();
        let status = timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("exit within timeout")
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_stdin_lines_reach_child() {
        let (tx, rx) = mpsc::channel(8);
        let command = ProcessCommandBuilder::new("grep")
            .arg(".")
            .stdin(rx)
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();

        tx.send("This output should be seen in our logs\n".to_string())
            .await
            .unwrap();
        drop(tx);

        // grep exits zero only if the relayed line arrived and matched.
        let status = timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("exit within timeout")
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_missing_executable_fails_spawn() {
        let command = ProcessCommand::new("nonexistent-command-12345");
        let err = command.spawn(CancellationToken::new()).unwrap_err();
        assert!(matches!(
            err,
            SpawnError::CommandNotFound(name) if name == "nonexistent-command-12345"
        ));
    }

    #[tokio::test]
    async fn test_forwards_lines_in_order() {
        // Channel smaller than the output exercises backpressure.
        let (tx, mut rx) = mpsc::channel(4);
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "for i in 1 2 3 4 5 6 7 8 9 10; do echo line-$i; done"])
            .stdout(tx)
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();

        let mut seen = Vec::new();
        while let Some(line) = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("stream close within timeout")
        {
            seen.push(line);
        }
        let expected: Vec<String> = (1..=10).map(|i| format!("line-{}", i)).collect();
        assert_eq!(seen, expected);

        assert!(handle.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_stderr_routes_to_its_own_sink() {
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let (err_tx, mut err_rx) = mpsc::channel(8);
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "echo to-stdout; echo to-stderr >&2"])
            .stdout(out_tx)
            .stderr(err_tx)
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();

        let out_line = timeout(Duration::from_secs(5), out_rx.recv())
            .await
            .expect("stdout line within timeout")
            .expect("stdout line");
        assert_eq!(out_line, "to-stdout");

        let err_line = timeout(Duration::from_secs(5), err_rx.recv())
            .await
            .expect("stderr line within timeout")
            .expect("stderr line");
        assert_eq!(err_line, "to-stderr");

        assert_eq!(out_rx.recv().await, None);
        assert_eq!(err_rx.recv().await, None);
        assert!(handle.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_environment_entries_reach_child() {
        let (tx, mut rx) = mpsc::channel(8);
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", r#"echo "$GREETING:${HOME:-unset}""#])
            .env("GREETING", "bonjour")
            .stdout(tx)
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();

        // GREETING was configured; HOME must not leak in from the parent.
        let line = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("line within timeout")
            .expect("one line");
        assert_eq!(line, "bonjour:unset");
        assert!(handle.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_inherit_env_reaches_child() {
        let (tx, mut rx) = mpsc::channel(8);
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "echo ${PATH:+inherited}"])
            .inherit_env()
            .stdout(tx)
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();

        let line = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("line within timeout")
            .expect("one line");
        assert_eq!(line, "inherited");
        assert!(handle.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_cancellation_kills_waited_child() {
        let token = CancellationToken::new();
        let command = ProcessCommandBuilder::new("sleep").arg("30").build();

        let handle = command.spawn(token.clone()).unwrap();
        token.cancel();

        let status = timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("killed within timeout")
            .unwrap();
        assert!(!status.success());
        #[cfg(unix)]
        assert_eq!(status.signal(), Some(9));
    }

    #[tokio::test]
    async fn test_cancellation_before_wait_kills_child() {
        let token = CancellationToken::new();
        let command = ProcessCommandBuilder::new("sleep").arg("30").build();

        let handle = command.spawn(token.clone()).unwrap();
        token.cancel();
        // Give the watcher a moment to deliver the kill before waiting.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let status = timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("killed within timeout")
            .unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn test_spawn_with_cancelled_token_kills_promptly() {
        let token = CancellationToken::new();
        token.cancel();
        let command = ProcessCommandBuilder::new("sleep").arg("30").build();

        let handle = command.spawn(token).unwrap();
        let status = timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("killed within timeout")
            .unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn test_dropped_sink_reports_relay_fault() {
        let (fault_tx, mut fault_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::channel(1);
        // Violate the caller contract up front: nobody drains the sink.
        drop(out_rx);

        let command = ProcessCommandBuilder::new("echo")
            .arg("nobody is listening")
            .stdout(out_tx)
            .fault_sink(ChannelFaultSink::new(fault_tx))
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();

        let fault = timeout(Duration::from_secs(5), fault_rx.recv())
            .await
            .expect("fault within timeout")
            .expect("fault delivered");
        assert!(matches!(
            fault,
            RelayFault::SinkClosed {
                stream: StreamSource::Stdout
            }
        ));
        assert!(handle.wait().await.unwrap().success());
    }

    #[tokio::test]
    async fn test_stdin_write_failure_reports_relay_fault() {
        let (fault_tx, mut fault_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::channel(8);

        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "exit 0"])
            .stdin(in_rx)
            .fault_sink(ChannelFaultSink::new(fault_tx))
            .build();

        let handle = command.spawn(CancellationToken::new()).unwrap();
        let status = handle.wait().await.unwrap();
        assert!(status.success());

        // The child is gone, so the next relayed line hits a closed pipe.
        in_tx.send("too late\n".to_string()).await.unwrap();

        let fault = timeout(Duration::from_secs(5), fault_rx.recv())
            .await
            .expect("fault within timeout")
            .expect("fault delivered");
        assert!(matches!(fault, RelayFault::StdinWrite(_)));
    }
}
