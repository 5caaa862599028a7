use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Account, CreateAccountCmd, CreateUserCmd, Currency, Engine, TransferTxCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Admin utilities for the ledger (users, accounts, transfers)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./ledger.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Account(AccountArgs),
    /// Move money between two accounts.
    Transfer(TransferArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    /// Check a password against the stored hash.
    Verify(UserVerifyArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    /// Skip the interactive prompt.
    #[arg(long, env = "LEDGER_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct UserVerifyArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "LEDGER_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    /// Print an account, its latest entries and whether it reconciles.
    Show(AccountShowArgs),
    /// Apply a direct balance adjustment (positive deposits, negative withdraws).
    Adjust(AccountAdjustArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long, default_value = "USD")]
    currency: String,
}

#[derive(Args, Debug)]
struct AccountShowArgs {
    #[arg(long)]
    id: i64,
    #[arg(long, default_value_t = 10)]
    entries: u64,
}

#[derive(Args, Debug)]
struct AccountAdjustArgs {
    #[arg(long)]
    id: i64,
    #[arg(long, allow_hyphen_values = true)]
    delta: i64,
}

#[derive(Args, Debug)]
struct TransferArgs {
    #[arg(long)]
    from: i64,
    #[arg(long)]
    to: i64,
    /// Amount in minor units.
    #[arg(long)]
    amount: i64,
    #[arg(long)]
    allow_overdraft: bool,
}

const MIN_PASSWORD_LEN: usize = 6;

fn print_account(account: &Account) {
    println!(
        "account {} owner={} balance={}",
        account.id,
        account.owner,
        account.currency.format_amount(account.balance)
    );
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Esc => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("cancelled".into());
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Ask for a new password and its confirmation, up to three times.
fn prompt_password_twice(username: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password(&format!("Password for {username}: "))?;
        if p1.chars().count() < MIN_PASSWORD_LEN {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters.\r\n"
                ))
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = match args.password {
                Some(password) => password,
                None => prompt_password_twice(&args.username)?,
            };
            let user = engine
                .create_user(CreateUserCmd {
                    username: args.username,
                    password,
                    full_name: args.full_name,
                    email: args.email,
                })
                .await?;

            println!("created user: {}", user.username);
        }
        Command::User(User {
            command: UserCommand::Verify(args),
        }) => {
            let password = match args.password {
                Some(password) => password,
                None => prompt_password(&format!("Password for {}: ", args.username))?,
            };
            if engine.verify_password(&args.username, &password).await? {
                println!("password ok for {}", args.username);
            } else {
                eprintln!("wrong password for {}", args.username);
                std::process::exit(1);
            }
        }
        Command::Account(AccountArgs {
            command: AccountCommand::Create(args),
        }) => {
            let currency = match Currency::try_from(args.currency.as_str()) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let account = engine
                .create_account(CreateAccountCmd::new(args.owner, currency))
                .await?;
            print_account(&account);
        }
        Command::Account(AccountArgs {
            command: AccountCommand::Show(args),
        }) => {
            let account = engine.account(args.id).await?;
            print_account(&account);
            for entry in engine.entries(args.id, args.entries, 0).await? {
                let source = entry
                    .transfer_id
                    .map_or_else(|| "adjustment".to_string(), |id| format!("transfer {id}"));
                println!(
                    "  #{} {} ({source}) at {}",
                    entry.id,
                    account.currency.format_amount(entry.amount),
                    entry.created_at
                );
            }
            let rec = engine.reconcile(args.id).await?;
            if !rec.is_consistent() {
                eprintln!(
                    "balance {} does not match entries total {}",
                    rec.balance, rec.entries_total
                );
                std::process::exit(1);
            }
        }
        Command::Account(AccountArgs {
            command: AccountCommand::Adjust(args),
        }) => {
            let account = engine.add_account_balance(args.id, args.delta).await?;
            print_account(&account);
        }
        Command::Transfer(args) => {
            let mut cmd = TransferTxCmd::new(args.from, args.to, args.amount);
            if args.allow_overdraft {
                cmd = cmd.allow_overdraft();
            }
            let res = engine.transfer_tx(cmd).await?;
            println!(
                "transfer {}: {} -> {} ({})",
                res.transfer.id,
                res.transfer.from_account_id,
                res.transfer.to_account_id,
                res.from_account.currency.format_amount(res.transfer.amount)
            );
            print_account(&res.from_account);
            print_account(&res.to_account);
        }
    }

    Ok(())
}
