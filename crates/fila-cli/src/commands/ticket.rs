//! Ticket management commands.
//!
//! These talk to the database directly and forward queue events to a running
//! server through its internal notify endpoint, so open displays still update.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use fila_core::{FilaConfig, NewTicket, TicketService, TicketStatus, WebNotifier};
use std::sync::Arc;

use crate::output;

#[derive(Subcommand)]
pub enum TicketCommands {
    /// Issue a new ticket
    New(NewTicketArgs),

    /// List tickets (waiting queue by default)
    List(ListTicketsArgs),

    /// Show a single ticket
    Show(ShowTicketArgs),

    /// Call a waiting ticket to a room
    Call(CallTicketArgs),
}

#[derive(Args)]
pub struct TenantArg {
    /// Tenant the ticket belongs to
    #[arg(short, long, env = "FILA_TENANT")]
    pub tenant: String,
}

#[derive(Args)]
pub struct NewTicketArgs {
    #[command(flatten)]
    pub tenant: TenantArg,

    /// Name of the person being served
    pub subject_name: String,

    /// Serve ahead of regular tickets
    #[arg(short, long)]
    pub priority: bool,

    /// Specialty requested
    #[arg(short, long, default_value = fila_core::ticket::model::DEFAULT_SPECIALTY)]
    pub specialty: String,
}

#[derive(Args)]
pub struct ListTicketsArgs {
    #[command(flatten)]
    pub tenant: TenantArg,

    /// Include called tickets, newest first
    #[arg(short, long)]
    pub all: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ShowTicketArgs {
    #[command(flatten)]
    pub tenant: TenantArg,

    /// Ticket ID
    pub ticket_id: String,
}

#[derive(Args)]
pub struct CallTicketArgs {
    #[command(flatten)]
    pub tenant: TenantArg,

    /// Ticket ID
    pub ticket_id: String,

    /// Room the subject should go to
    #[arg(short, long)]
    pub room: String,
}

pub async fn execute(cmd: TicketCommands, config: &FilaConfig) -> Result<()> {
    let pool = fila_db::init_pool(&config.database_path, config.pool_options()).await?;
    let service = TicketService::new(pool, Arc::new(WebNotifier::with_url(&config.web_url)));

    match cmd {
        TicketCommands::New(args) => {
            let input = NewTicket::new(args.subject_name, args.priority, args.specialty);
            let ticket = service.create_ticket(&args.tenant.tenant, input).await?;

            println!(
                "{} Issued ticket {} for {} ({})",
                "✓".green().bold(),
                ticket.display_code.cyan().bold(),
                ticket.subject_name,
                ticket.id.dimmed()
            );
        }

        TicketCommands::List(args) => {
            let tenant = &args.tenant.tenant;
            let tickets = if args.all {
                service.list_tickets(tenant).await?
            } else {
                service.list_waiting(tenant).await?
            };

            if args.json {
                println!("{}", serde_json::to_string_pretty(&tickets)?);
                return Ok(());
            }

            output::print_tickets_table(&tickets);

            let store = service.store();
            let waiting = store.count(tenant, TicketStatus::Waiting).await?;
            let called = store.count(tenant, TicketStatus::Called).await?;
            println!();
            println!(
                "{} waiting, {} called",
                waiting.to_string().yellow(),
                called.to_string().green()
            );
        }

        TicketCommands::Show(args) => {
            let tenant = &args.tenant.tenant;
            let ticket = service.get_ticket(tenant, &args.ticket_id).await?;
            output::print_ticket(&ticket);

            if ticket.is_waiting() {
                let waiting = service.list_waiting(tenant).await?;
                if let Some(position) = fila_core::queue::position_of(&waiting, &ticket.id) {
                    println!(
                        "{}: {} of {}",
                        "Position".bold(),
                        position.to_string().yellow(),
                        waiting.len()
                    );
                }
            }
        }

        TicketCommands::Call(args) => {
            let ticket = service
                .call_ticket(&args.tenant.tenant, &args.ticket_id, &args.room)
                .await?;

            println!(
                "{} Called {} ({}) to {}",
                "✓".green().bold(),
                ticket.display_code.cyan().bold(),
                ticket.subject_name,
                args.room.yellow()
            );
        }
    }

    Ok(())
}
