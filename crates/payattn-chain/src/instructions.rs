//! Instruction builders for all six `payattn_escrow` instructions, built
//! from the program crate's own generated `accounts`/`instruction` modules
//! (the same pattern `programs/payattn_escrow/tests/escrow_flow.rs` uses).

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
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::pda::{escrow_pda, program_config_pda};

pub fn initialize_program_ix(
    program_id: &Pubkey,
    authority: &Pubkey,
    refund_timeout_secs: Option<i64>,
) -> Instruction {
    let (program_config, _bump) = program_config_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: InitializeProgramAccounts {
            authority: *authority,
            program_config,
            system_program: system_program::ID,
        }
        .to_account_metas(None),
        data: InitializeProgramIx {
            refund_timeout_secs,
        }
        .data(),
    }
}

pub fn create_escrow_ix(
    program_id: &Pubkey,
    advertiser: &Pubkey,
    user: &Pubkey,
    platform: &Pubkey,
    offer_id: &[u8],
    amount: u64,
) -> Instruction {
    let (escrow, _bump) = escrow_pda(program_id, offer_id);
    Instruction {
        program_id: *program_id,
        accounts: CreateEscrowAccounts {
            advertiser: *advertiser,
            user: *user,
            platform: *platform,
            escrow,
            system_program: system_program::ID,
        }
        .to_account_metas(None),
        data: CreateEscrowIx {
            offer_id: offer_id.to_vec(),
            amount,
        }
        .data(),
    }
}

pub fn settle_user_ix(program_id: &Pubkey, escrow: &Pubkey, user: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: SettleUserAccounts {
            escrow: *escrow,
            user: *user,
        }
        .to_account_metas(None),
        data: SettleUserIx {}.data(),
    }
}

pub fn settle_publisher_ix(
    program_id: &Pubkey,
    escrow: &Pubkey,
    publisher: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: SettlePublisherAccounts {
            escrow: *escrow,
            publisher: *publisher,
        }
        .to_account_metas(None),
        data: SettlePublisherIx {}.data(),
    }
}

pub fn settle_platform_ix(
    program_id: &Pubkey,
    escrow: &Pubkey,
    platform: &Pubkey,
    advertiser: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: SettlePlatformAccounts {
            escrow: *escrow,
            platform: *platform,
            advertiser: *advertiser,
        }
        .to_account_metas(None),
        data: SettlePlatformIx {}.data(),
    }
}

pub fn refund_escrow_ix(program_id: &Pubkey, escrow: &Pubkey, advertiser: &Pubkey) -> Instruction {
    let (program_config, _bump) = program_config_pda(program_id);
    Instruction {
        program_id: *program_id,
        accounts: RefundEscrowAccounts {
            escrow: *escrow,
            advertiser: *advertiser,
            program_config,
        }
        .to_account_metas(None),
        data: RefundEscrowIx {}.data(),
    }
}
