use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{Favorite, FavoriteWithPlayer, OrderUpdate};

const FAVORITE_COLUMNS: &str = "id, scout_id, player_id, tournament_id, is_favorite, \
     is_exclusive, display_order, favorite_display_order, created_at";

pub fn find_by_key(
    conn: &mut DbConn,
    scout_id: i64,
    player_id: i64,
    tournament_id: i64,
) -> Result<Option<Favorite>> {
    let sql = format!(
        "SELECT {FAVORITE_COLUMNS} FROM favorites \
         WHERE scout_id = ?1 AND player_id = ?2 AND tournament_id = ?3"
    );

    conn.query_row(&sql, params![scout_id, player_id, tournament_id], parse_favorite_row)
        .optional()
        .context("Failed to query favorite by composite key")
}

/// Inserts a favorite row. Duplicate inserts for the same composite key are
/// treated as success, not conflict, so an optimistic client racing itself
/// converges instead of erroring.
pub fn insert_favorite(
    conn: &mut DbConn,
    scout_id: i64,
    player_id: i64,
    tournament_id: i64,
    is_exclusive: bool,
    display_order: i64,
    favorite_display_order: Option<i64>,
) -> Result<bool> {
    let sql = "INSERT INTO favorites \
         (scout_id, player_id, tournament_id, is_exclusive, display_order, favorite_display_order) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT (scout_id, player_id, tournament_id) DO NOTHING";

    let inserted = conn
        .execute(
            sql,
            params![
                scout_id,
                player_id,
                tournament_id,
                is_exclusive,
                display_order,
                favorite_display_order
            ],
        )
        .context("Failed to insert favorite")?;

    Ok(inserted > 0)
}

/// Hard delete by composite key. Removes the exclusive flag with the row;
/// deleting a missing row is a no-op.
pub fn delete_favorite(
    conn: &mut DbConn,
    scout_id: i64,
    player_id: i64,
    tournament_id: i64,
) -> Result<bool> {
    let sql = "DELETE FROM favorites WHERE scout_id = ?1 AND player_id = ?2 AND tournament_id = ?3";

    let deleted = conn
        .execute(sql, params![scout_id, player_id, tournament_id])
        .context("Failed to delete favorite")?;

    Ok(deleted > 0)
}

/// Flips only the exclusive flag, leaving the favorite row intact. Returns
/// false when no row matched the key.
pub fn set_exclusive(
    conn: &mut DbConn,
    scout_id: i64,
    player_id: i64,
    tournament_id: i64,
    is_exclusive: bool,
    favorite_display_order: Option<i64>,
) -> Result<bool> {
    let sql = "UPDATE favorites SET is_exclusive = ?4, favorite_display_order = ?5 \
         WHERE scout_id = ?1 AND player_id = ?2 AND tournament_id = ?3";

    let updated = conn
        .execute(
            sql,
            params![scout_id, player_id, tournament_id, is_exclusive, favorite_display_order],
        )
        .context("Failed to update exclusive flag")?;

    Ok(updated > 0)
}

pub fn count_exclusives(conn: &mut DbConn, scout_id: i64, tournament_id: i64) -> Result<i64> {
    let sql = "SELECT COUNT(*) FROM favorites \
         WHERE scout_id = ?1 AND tournament_id = ?2 AND is_exclusive = 1";

    conn.query_row(sql, params![scout_id, tournament_id], |row| row.get(0))
        .context("Failed to count exclusives")
}

/// Next free position at the end of the regular favorites list.
pub fn next_display_order(conn: &mut DbConn, scout_id: i64, tournament_id: i64) -> Result<i64> {
    let sql = "SELECT COALESCE(MAX(display_order) + 1, 0) FROM favorites \
         WHERE scout_id = ?1 AND tournament_id = ?2";

    conn.query_row(sql, params![scout_id, tournament_id], |row| row.get(0))
        .context("Failed to compute next display order")
}

pub fn list_for_scope(
    conn: &mut DbConn,
    scout_id: i64,
    tournament_id: i64,
) -> Result<Vec<Favorite>> {
    let sql = format!(
        "SELECT {FAVORITE_COLUMNS} FROM favorites \
         WHERE scout_id = ?1 AND tournament_id = ?2 \
         ORDER BY display_order, id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![scout_id, tournament_id], parse_favorite_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_with_players(
    conn: &mut DbConn,
    scout_id: i64,
    tournament_id: i64,
) -> Result<Vec<FavoriteWithPlayer>> {
    let sql = format!(
        "SELECT {}, p.name, p.position, p.jersey_number, p.team_name, p.photo_url \
         FROM favorites f JOIN players p ON p.id = f.player_id \
         WHERE f.scout_id = ?1 AND f.tournament_id = ?2 \
         ORDER BY f.display_order, f.id",
        FAVORITE_COLUMNS
            .split(", ")
            .map(|c| format!("f.{c}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![scout_id, tournament_id], |row| {
            Ok(FavoriteWithPlayer {
                favorite: parse_favorite_row(row)?,
                player_name: row.get(9)?,
                position: row.get(10)?,
                jersey_number: row.get(11)?,
                team_name: row.get(12)?,
                photo_url: row.get(13)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Writes only the fields the update supplies, scoped to rows owned by the
/// given scout and tournament. Rows outside that scope simply do not match
/// the predicate. Returns the number of rows written.
pub fn apply_order_update(
    conn: &mut DbConn,
    scout_id: i64,
    tournament_id: i64,
    update: &OrderUpdate,
) -> Result<usize> {
    let affected = match (update.display_order, update.favorite_display_order) {
        (Some(display), Some(exclusive)) => conn.execute(
            "UPDATE favorites SET display_order = ?4, favorite_display_order = ?5 \
             WHERE scout_id = ?1 AND tournament_id = ?2 AND player_id = ?3",
            params![scout_id, tournament_id, update.player_id, display, exclusive],
        ),
        (Some(display), None) => conn.execute(
            "UPDATE favorites SET display_order = ?4 \
             WHERE scout_id = ?1 AND tournament_id = ?2 AND player_id = ?3",
            params![scout_id, tournament_id, update.player_id, display],
        ),
        (None, Some(exclusive)) => conn.execute(
            "UPDATE favorites SET favorite_display_order = ?4 \
             WHERE scout_id = ?1 AND tournament_id = ?2 AND player_id = ?3",
            params![scout_id, tournament_id, update.player_id, exclusive],
        ),
        (None, None) => Ok(0),
    };

    affected.context("Failed to apply order update")
}

fn parse_favorite_row(row: &rusqlite::Row) -> rusqlite::Result<Favorite> {
    Ok(Favorite {
        id: row.get(0)?,
        scout_id: row.get(1)?,
        player_id: row.get(2)?,
        tournament_id: row.get(3)?,
        is_favorite: row.get(4)?,
        is_exclusive: row.get(5)?,
        display_order: row.get(6)?,
        favorite_display_order: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connection, setup};

    fn test_conn() -> DbConn {
        let pool = connection::create_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        setup::reset_database(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut conn = test_conn();

        assert!(insert_favorite(&mut conn, 1, 10, 5, false, 0, None).unwrap());
        assert!(!insert_favorite(&mut conn, 1, 10, 5, false, 0, None).unwrap());

        let row = find_by_key(&mut conn, 1, 10, 5).unwrap().unwrap();
        assert!(row.is_favorite);
        assert!(!row.is_exclusive);
    }

    #[test]
    fn test_delete_missing_row_is_noop() {
        let mut conn = test_conn();
        assert!(!delete_favorite(&mut conn, 1, 99, 5).unwrap());
    }

    #[test]
    fn test_delete_removes_exclusive_flag_with_row() {
        let mut conn = test_conn();
        insert_favorite(&mut conn, 1, 10, 5, true, 0, Some(0)).unwrap();

        assert!(delete_favorite(&mut conn, 1, 10, 5).unwrap());
        assert!(find_by_key(&mut conn, 1, 10, 5).unwrap().is_none());
        assert_eq!(count_exclusives(&mut conn, 1, 5).unwrap(), 0);
    }

    #[test]
    fn test_next_display_order_appends() {
        let mut conn = test_conn();
        assert_eq!(next_display_order(&mut conn, 1, 5).unwrap(), 0);

        insert_favorite(&mut conn, 1, 10, 5, false, 0, None).unwrap();
        insert_favorite(&mut conn, 1, 11, 5, false, 1, None).unwrap();
        assert_eq!(next_display_order(&mut conn, 1, 5).unwrap(), 2);
    }

    #[test]
    fn test_order_update_scoped_to_owner() {
        let mut conn = test_conn();
        insert_favorite(&mut conn, 1, 10, 5, false, 0, None).unwrap();
        insert_favorite(&mut conn, 2, 10, 5, false, 0, None).unwrap();

        let update = OrderUpdate {
            player_id: 10,
            display_order: Some(7),
            favorite_display_order: None,
        };
        // Scout 1's update must not touch scout 2's row for the same player.
        assert_eq!(apply_order_update(&mut conn, 1, 5, &update).unwrap(), 1);

        let other = find_by_key(&mut conn, 2, 10, 5).unwrap().unwrap();
        assert_eq!(other.display_order, 0);
    }

    #[test]
    fn test_order_update_leaves_unsupplied_field_untouched() {
        let mut conn = test_conn();
        insert_favorite(&mut conn, 1, 10, 5, true, 3, Some(1)).unwrap();

        let update = OrderUpdate {
            player_id: 10,
            display_order: Some(0),
            favorite_display_order: None,
        };
        apply_order_update(&mut conn, 1, 5, &update).unwrap();

        let row = find_by_key(&mut conn, 1, 10, 5).unwrap().unwrap();
        assert_eq!(row.display_order, 0);
        assert_eq!(row.favorite_display_order, Some(1));
    }

    #[test]
    fn test_list_with_players_joins_metadata() {
        let mut conn = test_conn();
        let player = crate::database::players::insert_player(
            &mut conn,
            "Luka Petric",
            Some("FW"),
            Some(11),
            Some("FK Sava"),
            None,
        )
        .unwrap();
        insert_favorite(&mut conn, 1, player.id, 5, false, 0, None).unwrap();

        let rows = list_with_players(&mut conn, 1, 5).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_name, "Luka Petric");
        assert_eq!(rows[0].jersey_number, Some(11));
    }
}
