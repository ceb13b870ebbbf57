//! End-to-end tests for the escrow program's instruction set, run against
//! an in-process BanksClient (solana-program-test). Covers the scenarios
//! described in spec.md §8: the happy path, the platform-first permutation,
//! already-settled idempotency, and the refund timeout.

use anchor_lang::{InstructionData, ToAccountMetas};
use payattn_escrow::accounts::{
    CreateEscrow as CreateEscrowAccounts, InitializeProgram as InitializeProgramAccounts,
    RefundEscrow as RefundEscrowAccounts, SettlePlatform as SettlePlatformAccounts,
    SettlePublisher as SettlePublisherAccounts, SettleUser as SettleUserAccounts,
};
use payattn_escrow::instruction::{
    CreateEscrow as CreateEscrowIx, InitializeProgram as InitializeProgramIx,
    RefundEscrow as RefundEscrowIx, SettlePlatform as SettlePlatformIx,
    SettlePublisher as SettlePublisherIx, SettleUser as SettleUserIx,
};
use payattn_escrow::ID as PROGRAM_ID;
use solana_program_test::*;
use solana_sdk::{
    clock::Clock,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_program,
    transaction::Transaction,
};

const ONE_SOL: u64 = 1_000_000_000;

fn program_config_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"program_config"], &PROGRAM_ID)
}

fn escrow_pda(offer_id: &[u8]) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"escrow", offer_id], &PROGRAM_ID)
}

async fn setup() -> ProgramTestContext {
    let test = ProgramTest::new(
        "payattn_escrow",
        PROGRAM_ID,
        processor!(payattn_escrow::entry),
    );
    test.start_with_context().await
}

async fn initialize_program(ctx: &mut ProgramTestContext, refund_timeout_secs: i64) -> Pubkey {
    let (program_config, _bump) = program_config_pda();

    let ix = Instruction {
        program_id: PROGRAM_ID,
        accounts: InitializeProgramAccounts {
            authority: ctx.payer.pubkey(),
            program_config,
            system_program: system_program::ID,
        }
        .to_account_metas(None),
        data: InitializeProgramIx {
            refund_timeout_secs: Some(refund_timeout_secs),
        }
        .data(),
    };

    let blockhash = ctx.banks_client.get_latest_blockhash().await.unwrap();
    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&ctx.payer.pubkey()),
        &[&ctx.payer],
        blockhash,
    );
    ctx.banks_client.process_transaction(tx).await.unwrap();

    program_config
}

struct EscrowFixture {
    offer_id: Vec<u8>,
    amount: u64,
    advertiser: Keypair,
    user: Keypair,
    publisher: Keypair,
    platform: Keypair,
    escrow: Pubkey,
}

async fn create_escrow(ctx: &mut ProgramTestContext, offer_id: &[u8], amount: u64) -> EscrowFixture {
    let advertiser = Keypair::new();
    let user = Keypair::new();
    let publisher = Keypair::new();
    let platform = Keypair::new();
    let (escrow, _bump) = escrow_pda(offer_id);

    // Fund the advertiser from the test payer.
    let blockhash = ctx.banks_client.get_latest_blockhash().await.unwrap();
    let fund_tx = Transaction::new_signed_with_payer(
        &[solana_sdk::system_instruction::transfer(
            &ctx.payer.pubkey(),
            &advertiser.pubkey(),
            amount + ONE_SOL,
        )],
        Some(&ctx.payer.pubkey()),
        &[&ctx.payer],
        blockhash,
    );
    ctx.banks_client.process_transaction(fund_tx).await.unwrap();

    let ix = Instruction {
        program_id: PROGRAM_ID,
        accounts: CreateEscrowAccounts {
            advertiser: advertiser.pubkey(),
            user: user.pubkey(),
            platform: platform.pubkey(),
            escrow,
            system_program: system_program::ID,
        }
        .to_account_metas(None),
        data: CreateEscrowIx {
            offer_id: offer_id.to_vec(),
            amount,
        }
        .data(),
    };

    let blockhash = ctx.banks_client.get_latest_blockhash().await.unwrap();
    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&advertiser.pubkey()),
        &[&advertiser],
        blockhash,
    );
    ctx.banks_client.process_transaction(tx).await.unwrap();

    EscrowFixture {
        offer_id: offer_id.to_vec(),
        amount,
        advertiser,
        user,
        publisher,
        platform,
        escrow,
    }
}

fn settle_user_ix(fx: &EscrowFixture) -> Instruction {
    Instruction {
        program_id: PROGRAM_ID,
        accounts: SettleUserAccounts {
            escrow: fx.escrow,
            user: fx.user.pubkey(),
        }
        .to_account_metas(None),
        data: SettleUserIx {}.data(),
    }
}

fn settle_publisher_ix(fx: &EscrowFixture) -> Instruction {
    Instruction {
        program_id: PROGRAM_ID,
        accounts: SettlePublisherAccounts {
            escrow: fx.escrow,
            publisher: fx.publisher.pubkey(),
        }
        .to_account_metas(None),
        data: SettlePublisherIx {}.data(),
    }
}

fn settle_platform_ix(fx: &EscrowFixture) -> Instruction {
    Instruction {
        program_id: PROGRAM_ID,
        accounts: SettlePlatformAccounts {
            escrow: fx.escrow,
            platform: fx.platform.pubkey(),
            advertiser: fx.advertiser.pubkey(),
        }
        .to_account_metas(None),
        data: SettlePlatformIx {}.data(),
    }
}

async fn send(ctx: &mut ProgramTestContext, ix: Instruction) -> Result<(), BanksClientError> {
    let blockhash = ctx.banks_client.get_latest_blockhash().await.unwrap();
    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&ctx.payer.pubkey()),
        &[&ctx.payer],
        blockhash,
    );
    ctx.banks_client.process_transaction(tx).await
}

#[tokio::test]
async fn happy_path_settles_all_three_legs_and_closes_account() {
    let mut ctx = setup().await;
    let fx = create_escrow(&mut ctx, b"offer_abc", 1_000_000_000).await;

    // Permutation: publisher, user, platform (scenario A in spec.md §8).
    send(&mut ctx, settle_publisher_ix(&fx)).await.unwrap();
    send(&mut ctx, settle_user_ix(&fx)).await.unwrap();
    send(&mut ctx, settle_platform_ix(&fx)).await.unwrap();

    // Account is closed once all three legs land.
    let account = ctx.banks_client.get_account(fx.escrow).await.unwrap();
    assert!(account.is_none(), "escrow account should be closed after full settlement");

    let user_balance = ctx.banks_client.get_balance(fx.user.pubkey()).await.unwrap();
    let publisher_balance = ctx
        .banks_client
        .get_balance(fx.publisher.pubkey())
        .await
        .unwrap();
    let platform_balance = ctx
        .banks_client
        .get_balance(fx.platform.pubkey())
        .await
        .unwrap();

    assert_eq!(user_balance, 700_000_000);
    assert_eq!(publisher_balance, 250_000_000);
    // Platform absorbs the rounding remainder and whatever the rent
    // reserve leaves unaccounted for relative to a naive 5% split.
    assert_eq!(
        user_balance + publisher_balance + platform_balance,
        fx.amount
    );
}

#[tokio::test]
async fn platform_first_permutation_rejects_until_prerequisites_settle() {
    let mut ctx = setup().await;
    let fx = create_escrow(&mut ctx, b"offer_platform_first", 500_000_000).await;

    // Platform attempted first: must fail with PrerequisiteNotSettled.
    let result = send(&mut ctx, settle_platform_ix(&fx)).await;
    assert!(result.is_err(), "settle_platform before user/publisher must fail");

    // Once user and publisher land, platform succeeds.
    send(&mut ctx, settle_user_ix(&fx)).await.unwrap();
    send(&mut ctx, settle_publisher_ix(&fx)).await.unwrap();
    send(&mut ctx, settle_platform_ix(&fx)).await.unwrap();

    let account = ctx.banks_client.get_account(fx.escrow).await.unwrap();
    assert!(account.is_none());
}

#[tokio::test]
async fn settle_user_twice_is_already_settled_on_second_call() {
    let mut ctx = setup().await;
    let fx = create_escrow(&mut ctx, b"offer_double_settle", 200_000_000).await;

    send(&mut ctx, settle_user_ix(&fx)).await.unwrap();
    let second = send(&mut ctx, settle_user_ix(&fx)).await;
    assert!(second.is_err(), "second settle_user must return AlreadySettled");
}

#[tokio::test]
async fn boundary_amount_of_one_gives_platform_everything() {
    let mut ctx = setup().await;
    // Amount of 1 lamport above the rent reserve: both user and publisher
    // shares floor to zero; platform absorbs the whole distributable pool.
    let fx = create_escrow(&mut ctx, b"offer_tiny", 2_000_000).await;

    send(&mut ctx, settle_user_ix(&fx)).await.unwrap();
    send(&mut ctx, settle_publisher_ix(&fx)).await.unwrap();
    send(&mut ctx, settle_platform_ix(&fx)).await.unwrap();

    let user_balance = ctx.banks_client.get_balance(fx.user.pubkey()).await.unwrap();
    let publisher_balance = ctx
        .banks_client
        .get_balance(fx.publisher.pubkey())
        .await
        .unwrap();
    assert_eq!(user_balance, 0);
    assert_eq!(publisher_balance, 0);
}

#[tokio::test]
async fn refund_requires_no_settlement_and_elapsed_timeout() {
    let mut ctx = setup().await;
    let refund_timeout_secs: i64 = 3600; // 1 hour, shortened for the test
    let program_config = initialize_program(&mut ctx, refund_timeout_secs).await;
    let fx = create_escrow(&mut ctx, b"offer_xyz", 500_000_000).await;

    let refund_ix = |advertiser_is_signer: &Keypair| Instruction {
        program_id: PROGRAM_ID,
        accounts: RefundEscrowAccounts {
            escrow: fx.escrow,
            advertiser: advertiser_is_signer.pubkey(),
            program_config,
        }
        .to_account_metas(None),
        data: RefundEscrowIx {}.data(),
    };

    // Too early: refund must fail.
    let blockhash = ctx.banks_client.get_latest_blockhash().await.unwrap();
    let early_tx = Transaction::new_signed_with_payer(
        &[refund_ix(&fx.advertiser)],
        Some(&fx.advertiser.pubkey()),
        &[&fx.advertiser],
        blockhash,
    );
    assert!(ctx.banks_client.process_transaction(early_tx).await.is_err());

    // Warp the on-chain clock forward past the refund timeout.
    let mut clock: Clock = ctx.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp += refund_timeout_secs + 1;
    ctx.set_sysvar(&clock);

    let blockhash = ctx.banks_client.get_latest_blockhash().await.unwrap();
    let late_tx = Transaction::new_signed_with_payer(
        &[refund_ix(&fx.advertiser)],
        Some(&fx.advertiser.pubkey()),
        &[&fx.advertiser],
        blockhash,
    );
    ctx.banks_client.process_transaction(late_tx).await.unwrap();

    let account = ctx.banks_client.get_account(fx.escrow).await.unwrap();
    assert!(account.is_none(), "escrow should be closed after refund");
}
