//! Conversions between engine values and API bodies.

use api_types::{
    Currency,
    account::{AccountView, EntryView},
    transfer::{TransferTxView, TransferView},
    user::UserView,
};
use engine::{Account, Entry, Transfer, TransferTxResult, User};

pub fn currency_to_engine(currency: Currency) -> engine::Currency {
    match currency {
        Currency::Cad => engine::Currency::Cad,
        Currency::Eur => engine::Currency::Eur,
        Currency::Gbp => engine::Currency::Gbp,
        Currency::Usd => engine::Currency::Usd,
    }
}

pub fn currency_from_engine(currency: engine::Currency) -> Currency {
    match currency {
        engine::Currency::Cad => Currency::Cad,
        engine::Currency::Eur => Currency::Eur,
        engine::Currency::Gbp => Currency::Gbp,
        engine::Currency::Usd => Currency::Usd,
    }
}

pub fn user(user: User) -> UserView {
    UserView {
        username: user.username,
        full_name: user.full_name,
        email: user.email,
        password_changed_at: user.password_changed_at,
        created_at: user.created_at,
    }
}

pub fn account(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        owner: account.owner,
        balance: account.balance,
        currency: currency_from_engine(account.currency),
        created_at: account.created_at,
    }
}

pub fn entry(entry: Entry) -> EntryView {
    EntryView {
        id: entry.id,
        account_id: entry.account_id,
        amount: entry.amount,
        transfer_id: entry.transfer_id,
        created_at: entry.created_at,
    }
}

pub fn transfer(transfer: Transfer) -> TransferView {
    TransferView {
        id: transfer.id,
        from_account_id: transfer.from_account_id,
        to_account_id: transfer.to_account_id,
        amount: transfer.amount,
        created_at: transfer.created_at,
    }
}

pub fn transfer_tx(res: TransferTxResult) -> TransferTxView {
    TransferTxView {
        transfer: transfer(res.transfer),
        from_account: account(res.from_account),
        to_account: account(res.to_account),
        from_entry: entry(res.from_entry),
        to_entry: entry(res.to_entry),
    }
}
