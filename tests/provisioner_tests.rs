mod support;

use std::sync::Arc;

use alloy_primitives::Bytes;

use lpforge::adapter::outbound::market::FactoryMarketDirectory;
use lpforge::application::retry::RetryPolicy;
use lpforge::domain::resource::{ProvisioningTask, ResourceKind};
use lpforge::error::Error;
use lpforge::port::{DeploymentStore, MarketDirectory, ProvisionEvent};

use support::chain::{market, MockChain, MARKET_FACTORY, USDC};
use support::recording::RecordingVerifier;
use support::Harness;

fn registry_task() -> ProvisioningTask {
    ProvisioningTask::new(
        ResourceKind::Registry,
        "LPRegistry",
        "LPRegistry",
        Bytes::from(vec![0xab, 0xcd]),
    )
}

#[tokio::test]
async fn deploys_once_per_name() {
    let harness = Harness::new(0);
    let provisioner = harness.provisioner(RetryPolicy::none());

    let first = provisioner.provision(&registry_task()).await.unwrap();
    let second = provisioner.provision(&registry_task()).await.unwrap();

    assert!(first.newly_created);
    assert!(!second.newly_created);
    assert_eq!(first.address, second.address);
    assert_eq!(second.block_number, None);
    assert_eq!(harness.chain.deploy_count(), 1);
    assert_eq!(harness.artifacts.loaded(), vec!["LPRegistry".to_string()]);
}

#[tokio::test]
async fn record_describes_the_deployment() {
    let harness = Harness::new(0);
    let provisioner = harness.provisioner(RetryPolicy::none());

    let created = provisioner.provision(&registry_task()).await.unwrap();
    let record = harness.store.get("LPRegistry").unwrap().unwrap();

    assert_eq!(record.address, created.address);
    assert_eq!(record.artifact, "LPRegistry");
    assert_eq!(record.constructor_args.as_ref(), &[0xab, 0xcd]);
    assert!(record.tx_hash.is_some());
    assert_eq!(record.block_number, created.block_number);
    assert_eq!(record.kind, Some(ResourceKind::Registry));
    assert_eq!(record.related, None);
}

#[tokio::test]
async fn lost_creation_receipt_is_polled_not_redeployed() {
    let harness = Harness::new(1);
    harness.chain.drop_next_receipts(2);
    let provisioner = harness.provisioner(RetryPolicy::new(3, 0));
    let task = registry_task().related_to(market(0));

    let created = provisioner.provision(&task).await.unwrap();

    assert!(created.newly_created);
    assert_eq!(harness.chain.deploy_count(), 1);
    assert_eq!(harness.chain.signed_count(), 1);
    let record = harness.store.get("LPRegistry").unwrap().unwrap();
    assert_eq!(record.address, created.address);
    assert_eq!(record.related, Some(market(0)));
}

#[tokio::test]
async fn existing_does_not_deploy() {
    let harness = Harness::new(0);
    let provisioner = harness.provisioner(RetryPolicy::none());

    assert_eq!(provisioner.existing("LPRegistry").unwrap(), None);
    let created = provisioner.provision(&registry_task()).await.unwrap();
    let found = provisioner.existing("LPRegistry").unwrap().unwrap();

    assert_eq!(found.address, created.address);
    assert!(!found.newly_created);
    assert_eq!(harness.chain.deploy_count(), 1);
}

#[tokio::test]
async fn reuse_is_observed() {
    let harness = Harness::new(0);
    let provisioner = harness.provisioner(RetryPolicy::none());

    provisioner.provision(&registry_task()).await.unwrap();
    provisioner.provision(&registry_task()).await.unwrap();

    let events = harness.observer.events();
    assert!(matches!(
        events[0],
        ProvisionEvent::Created {
            kind: ResourceKind::Registry,
            ..
        }
    ));
    assert!(matches!(
        events[1],
        ProvisionEvent::Reused {
            kind: ResourceKind::Registry,
            ..
        }
    ));
}

#[tokio::test]
async fn verification_uses_qualified_name() {
    let harness = Harness::new(0);
    let provisioner = harness.provisioner(RetryPolicy::none());

    let created = provisioner.provision(&registry_task()).await.unwrap();
    let requests = harness.verifier.requests();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].address, created.address);
    assert_eq!(requests[0].contract_name, "contracts/LPRegistry.sol:LPRegistry");
}

#[tokio::test]
async fn verification_failure_is_not_an_error() {
    let harness = Harness::new(0).with_verifier(RecordingVerifier::rejecting());
    let provisioner = harness.provisioner(RetryPolicy::none());

    let created = provisioner.provision(&registry_task()).await.unwrap();

    assert!(created.newly_created);
    assert!(harness.store.get("LPRegistry").unwrap().is_some());
    assert_eq!(
        harness
            .observer
            .count(|e| matches!(e, ProvisionEvent::VerificationFailed { .. })),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn failed_creation_stores_nothing() {
    let harness = Harness::new(1);
    harness.chain.fail_deploys_for(market(0));
    let provisioner = harness.provisioner(RetryPolicy::new(3, 10));

    let mut args = vec![0u8; 12];
    args.extend_from_slice(market(0).as_slice());
    let task = ProvisioningTask::new(ResourceKind::Instance, "LP-m0", "LP", args.into());

    let err = provisioner.provision(&task).await.unwrap_err();

    assert!(matches!(err, Error::Chain(_)));
    assert!(harness.store.get("LP-m0").unwrap().is_none());
    assert_eq!(harness.chain.deploy_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn market_reads_recover_from_transient_failures() {
    let chain = Arc::new(MockChain::with_markets(2));
    chain.fail_next_reads(2);
    let directory = FactoryMarketDirectory::new(chain, MARKET_FACTORY, RetryPolicy::new(3, 10));

    let markets = directory.list_markets().await.unwrap();

    assert_eq!(markets.len(), 2);
    assert_eq!(markets[0].settlement_token.address, USDC);
    assert_eq!(markets[0].settlement_token.symbol, "USDC");
    assert_eq!(markets[0].settlement_token.decimals, 6);
}

#[tokio::test(start_paused = true)]
async fn market_reads_give_up_after_budget() {
    let chain = Arc::new(MockChain::with_markets(1));
    chain.fail_next_reads(3);
    let directory = FactoryMarketDirectory::new(chain, MARKET_FACTORY, RetryPolicy::new(3, 10));

    assert!(directory.list_markets().await.is_err());
}
