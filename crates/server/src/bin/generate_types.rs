use std::{fs, path::PathBuf};

use db::models::{
    sprint::{Sprint, SprintWithTickets},
    ticket::{CreateTicket, PriorityOption, Ticket, TicketPriority, TicketStatus, UpdateTicket},
};
use server::routes::{
    board::MoveTicketRequest, sprints::ProposeSprintRequest, tickets::UpdateTicketStatus,
};
use services::services::{
    board::{BoardLanes, Lane},
    sprint_plan::{PlannedTicket, ProposedSprint, StartSprintRequest},
    ticket_editor::{SubmittedTicket, TicketForm},
};
use ts_rs::TS;
use utils::response::ApiResponse;

fn generate_types_content() -> String {
    let decls = [
        TicketStatus::decl(),
        TicketPriority::decl(),
        PriorityOption::decl(),
        Ticket::decl(),
        CreateTicket::decl(),
        UpdateTicket::decl(),
        UpdateTicketStatus::decl(),
        TicketForm::decl(),
        SubmittedTicket::decl(),
        Lane::decl(),
        BoardLanes::decl(),
        MoveTicketRequest::decl(),
        Sprint::decl(),
        SprintWithTickets::decl(),
        PlannedTicket::decl(),
        ProposedSprint::decl(),
        ProposeSprintRequest::decl(),
        StartSprintRequest::decl(),
        ApiResponse::<()>::decl(),
    ];

    let mut content = String::from(
        "// This file was generated by `cargo run --bin generate_types`. Do not edit.\n\n",
    );
    for decl in decls {
        content.push_str("export ");
        content.push_str(&decl);
        content.push_str("\n\n");
    }
    content
}

fn main() -> std::io::Result<()> {
    let shared = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../shared");
    fs::create_dir_all(&shared)?;

    let path = shared.join("types.ts");
    fs::write(&path, generate_types_content())?;
    println!("Wrote {}", path.display());
    Ok(())
}
