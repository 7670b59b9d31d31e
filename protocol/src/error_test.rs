use std::time::Duration;

use tokio::time::{sleep, timeout};

use super::*;

#[tokio::test]
async fn clones_share_one_queue() {
    let (tx, errors) = Errors::channel();
    let other = errors.clone();

    tx.send(Error::NoPayload).await.unwrap();

    assert!(matches!(other.try_recv(), Some(Error::NoPayload)));
    assert!(errors.try_recv().is_none());
}

#[tokio::test]
async fn try_recv_is_empty_while_a_clone_waits() {
    let (tx, errors) = Errors::channel();
    let waiter = errors.clone();
    let pending = tokio::spawn(async move { waiter.recv().await });
    sleep(Duration::from_millis(20)).await;

    assert!(errors.try_recv().is_none());

    tx.send(Error::ConnectionClosed).await.unwrap();
    let received = timeout(Duration::from_secs(2), pending).await.unwrap().unwrap();
    assert!(matches!(received, Some(Error::ConnectionClosed)));
}

#[tokio::test]
async fn recv_ends_once_producers_are_gone() {
    let (tx, errors) = Errors::channel();
    drop(tx);

    assert!(errors.recv().await.is_none());
}
