//! Initial league schema: users, teams, player profiles, matches

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. users
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_len(User::Username, 150).not_null().unique_key())
                    .col(string_len(User::Email, 254).not_null().default(""))
                    .col(string_len(User::FirstName, 150).not_null().default(""))
                    .col(string_len(User::LastName, 150).not_null().default(""))
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(string_len(User::Role, 16).not_null().default("PLAYER"))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. teams
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(pk_auto(Team::Id))
                    .col(string_len(Team::Name, 100).not_null())
                    .col(string_len(Team::Country, 100).not_null())
                    .col(integer_null(Team::CaptainId))
                    .col(integer(Team::MatchesPlayed).not_null().default(0))
                    .col(integer(Team::Wins).not_null().default(0))
                    .col(integer(Team::Lost).not_null().default(0))
                    .col(integer(Team::Draw).not_null().default(0))
                    .col(integer(Team::Points).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(Team::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_captain_id")
                            .from(Team::Table, Team::CaptainId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_captain_id")
                    .table(Team::Table)
                    .col(Team::CaptainId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. player_profiles
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(PlayerProfile::Table)
                    .if_not_exists()
                    .col(pk_auto(PlayerProfile::Id))
                    .col(integer(PlayerProfile::UserId).not_null().unique_key())
                    .col(integer(PlayerProfile::Age).not_null())
                    .col(
                        string_len(PlayerProfile::Type, 20)
                            .not_null()
                            .default("BATTER"),
                    )
                    .col(integer(PlayerProfile::TeamId).not_null())
                    .col(integer(PlayerProfile::MatchesPlayed).not_null().default(0))
                    .col(integer(PlayerProfile::TotalRuns).not_null().default(0))
                    .col(integer(PlayerProfile::Wickets).not_null().default(0))
                    .col(boolean(PlayerProfile::IsPlaying).not_null().default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_profiles_user_id")
                            .from(PlayerProfile::Table, PlayerProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_profiles_team_id")
                            .from(PlayerProfile::Table, PlayerProfile::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Playing-XI lookups filter on (team_id, is_playing)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_player_profiles_team_playing")
                    .table(PlayerProfile::Table)
                    .col(PlayerProfile::TeamId)
                    .col(PlayerProfile::IsPlaying)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. matches
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Match::Table)
                    .if_not_exists()
                    .col(pk_auto(Match::Id))
                    .col(date(Match::Date).not_null())
                    .col(string_len(Match::Venue, 200).not_null())
                    .col(integer(Match::Team1Id).not_null())
                    .col(integer(Match::Team2Id).not_null())
                    .col(integer_null(Match::WinnerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_team1_id")
                            .from(Match::Table, Match::Team1Id)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_team2_id")
                            .from(Match::Table, Match::Team2Id)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_winner_id")
                            .from(Match::Table, Match::WinnerId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_matches_team1_id")
                    .table(Match::Table)
                    .col(Match::Team1Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_matches_team2_id")
                    .table(Match::Table)
                    .col(Match::Team2Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Match::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    PasswordHash,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    Name,
    Country,
    CaptainId,
    MatchesPlayed,
    Wins,
    Lost,
    Draw,
    Points,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlayerProfile {
    #[sea_orm(iden = "player_profiles")]
    Table,
    Id,
    UserId,
    Age,
    Type,
    TeamId,
    MatchesPlayed,
    TotalRuns,
    Wickets,
    IsPlaying,
}

#[derive(DeriveIden)]
enum Match {
    #[sea_orm(iden = "matches")]
    Table,
    Id,
    Date,
    Venue,
    Team1Id,
    Team2Id,
    WinnerId,
}
