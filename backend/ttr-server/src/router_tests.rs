//! Integration tests for the _Ticket To Ride_ web server.

use crate::build;
use crate::controller::GameIdSessionMapping;
use crate::identity::{Seat, SEAT_COOKIE_NAME};
use crate::request_types::*;

use pretty_assertions::assert_eq;
use regex::Regex;
use rocket::{
    error::ErrorKind,
    figment::Figment,
    http::{ContentType, Cookie, Status},
    local::blocking::{Client, LocalResponse},
};
use serde_json::{json, Value};
use ttr_engine::{
    board::RouteId,
    card::TrainColor,
    claim::{self, route_score},
    player::PlayerId,
    session::{GamePhase, GameSession},
    turn::DrawSlot,
};
use uuid::Uuid;

fn figment() -> Figment {
    rocket::Config::figment().merge(("game.seed", 7))
}

fn new_client() -> Client {
    Client::untracked(build(figment())).expect("valid rocket")
}

fn game_state(client: &Client) -> &GameIdSessionMapping {
    client
        .rocket()
        .state::<GameIdSessionMapping>()
        .expect("sessions are managed")
}

fn validate_state_if<F>(state: &GameIdSessionMapping, game_id: &Uuid, predicate: F)
where
    F: FnOnce(&GameSession),
{
    let session = state.get(game_id);
    assert!(session.is_some());
    let session = session.unwrap();

    predicate(&*session);
}

fn validate_state_num_of_players(
    state: &GameIdSessionMapping,
    game_id: &Uuid,
    expected_num_players: usize,
) {
    validate_state_if(state, game_id, |session| {
        assert_eq!(session.players().len(), expected_num_players);
    });
}

fn validate_state_phase(state: &GameIdSessionMapping, game_id: &Uuid, phase: GamePhase) {
    validate_state_if(state, game_id, |session| {
        assert_eq!(session.phase(), phase);
    });
}

fn validate_state_turn(state: &GameIdSessionMapping, game_id: &Uuid, turn: Option<PlayerId>) {
    validate_state_if(state, game_id, |session| {
        assert_eq!(session.current_player(), turn);
    });
}

/// Looks for a route that the current player can claim with their hand, if any.
///
/// The session guard is released before returning, so that requests can be dispatched.
fn find_claimable_route(
    state: &GameIdSessionMapping,
    game_id: &Uuid,
) -> (PlayerId, Option<RouteId>) {
    let session = state.get(game_id).expect("game exists");
    let current = session.current_player().expect("game is running");
    let player = &session.players()[current];

    let route = session
        .board()
        .routes()
        .iter()
        .find(|route| claim::validate(session.board(), player, current, route.id(), None).is_ok())
        .map(|route| route.id());

    (current, route)
}

fn expect_valid_action_response(res: LocalResponse) -> Value {
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.content_type(), Some(ContentType::JSON));

    let res_json = res.into_json::<Value>();
    assert!(res_json.is_some());
    let res_json = res_json.unwrap();

    assert!(
        res_json["success"].as_bool().unwrap_or(false),
        "Expected success=true, but got success=false. Error: {:?}",
        res_json["error_message"]
    );
    assert_eq!(res_json["error_code"], Value::Null);
    assert!(res_json["state"].is_object());

    res_json["state"].clone()
}

fn expect_invalid_action_response(res: LocalResponse, error_code: &str) {
    assert_eq!(res.status(), Status::Ok);

    let res_json = res.into_json::<Value>();
    assert!(res_json.is_some());
    let res_json = res_json.unwrap();

    assert_eq!(res_json["success"], false, "Expected success=false.");
    assert_eq!(res_json["error_code"], error_code);
    assert!(res_json["error_message"].is_string());
    assert_eq!(res_json["state"], Value::Null);
}

fn create_game(client: &Client) -> Uuid {
    let res = client.post("/create").dispatch();

    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.cookies().iter().count(), 0);

    let res_json = res.into_json::<Value>();
    assert!(res_json.is_some());
    let res_json = res_json.unwrap();

    let game_id_str = res_json["game_id"].as_str();
    assert!(game_id_str.is_some());
    let game_id_str = game_id_str.unwrap();

    assert!(Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .unwrap()
        .is_match(game_id_str));

    let game_id = Uuid::parse_str(game_id_str);
    assert!(game_id.is_ok());
    game_id.unwrap()
}

fn join_game<'c>(client: &'c Client, game_id: &Uuid, name: &str) -> LocalResponse<'c> {
    client
        .post(format!("/game/{}/join", game_id))
        .json(&JoinRequest {
            name: String::from(name),
        })
        .dispatch()
}

/// Joins the game with every name, and returns the cookie of each player, in order.
fn join_players(client: &Client, game_id: &Uuid, names: &[&str]) -> Vec<Cookie<'static>> {
    names
        .iter()
        .map(|name| {
            let res = join_game(client, game_id, name);
            assert_eq!(res.status(), Status::Ok);

            let cookie = res.cookies().get_private(SEAT_COOKIE_NAME);
            assert!(cookie.is_some());
            let cookie = cookie.unwrap();

            expect_valid_action_response(res);
            cookie
        })
        .collect()
}

fn start_game<'c>(client: &'c Client, game_id: &Uuid, cookie: &Cookie<'static>) -> LocalResponse<'c> {
    client
        .post(format!("/game/{}/start", game_id))
        .private_cookie(cookie.clone())
        .dispatch()
}

fn draw_card<'c>(
    client: &'c Client,
    game_id: &Uuid,
    cookie: &Cookie<'static>,
    slot: DrawSlot,
) -> LocalResponse<'c> {
    client
        .post(format!("/game/{}/draw", game_id))
        .private_cookie(cookie.clone())
        .json(&DrawRequest { slot })
        .dispatch()
}

fn claim_route<'c>(
    client: &'c Client,
    game_id: &Uuid,
    cookie: &Cookie<'static>,
    route: RouteId,
    color: Option<TrainColor>,
) -> LocalResponse<'c> {
    client
        .post(format!("/game/{}/claim", game_id))
        .private_cookie(cookie.clone())
        .json(&ClaimRequest {
            route: RouteSelector::Id { route },
            color,
        })
        .dispatch()
}

fn claim_route_between<'c>(
    client: &'c Client,
    game_id: &Uuid,
    cookie: &Cookie<'static>,
    cities: (&str, &str),
    color: Option<TrainColor>,
) -> LocalResponse<'c> {
    client
        .post(format!("/game/{}/claim", game_id))
        .private_cookie(cookie.clone())
        .json(&json!({"from": cities.0, "to": cities.1, "color": color}))
        .dispatch()
}

fn get_state<'c>(client: &'c Client, game_id: &Uuid, cookie: &Cookie<'static>) -> LocalResponse<'c> {
    client
        .get(format!("/game/{}/state", game_id))
        .private_cookie(cookie.clone())
        .dispatch()
}

/// Creates a game, with every name joined and the game started by the first one.
fn new_started_game(client: &Client, names: &[&str]) -> (Uuid, Vec<Cookie<'static>>) {
    let game_id = create_game(client);
    let cookies = join_players(client, &game_id, names);

    expect_valid_action_response(start_game(client, &game_id, &cookies[0]));
    (game_id, cookies)
}

// Tests for the launch of the server.

#[test]
fn router_launch_with_invalid_config() {
    let invalid_figments = [
        figment().merge(("game.starting_wagons", 0)),
        figment().merge(("game.max_players", 9)),
        figment().merge(("map_path", "maps/does-not-exist.json")),
    ];

    for figment in invalid_figments {
        let client = Client::untracked(build(figment));
        assert!(matches!(
            client.as_ref().map_err(|e| e.kind()),
            Err(ErrorKind::FailedFairings(_))
        ));
    }
}

// Tests for the lobby.

#[test]
fn router_create_game() {
    let client = new_client();
    let game_id = create_game(&client);

    let state = game_state(&client);
    validate_state_num_of_players(state, &game_id, 0);
    validate_state_phase(state, &game_id, GamePhase::InLobby);
    validate_state_turn(state, &game_id, None);

    // Every game gets its own ID.
    assert_ne!(create_game(&client), game_id);
}

#[test]
fn router_join_game() {
    let client = new_client();
    let game_id = create_game(&client);
    let game_path = format!("/game/{}", game_id);
    let state = game_state(&client);

    let res = join_game(&client, &game_id, "Alice");
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.cookies().iter().count(), 1);

    let cookie = res.cookies().get_private(SEAT_COOKIE_NAME);
    assert!(cookie.is_some());
    let cookie = cookie.unwrap();
    assert_eq!(cookie.value(), format!("{}/0", game_id));
    assert_eq!(cookie.path(), Some(game_path.as_str()));

    let res_state = expect_valid_action_response(res);
    assert_eq!(res_state["phase"], "in_lobby");
    assert_eq!(res_state["players"][0]["name"], "Alice");
    assert_eq!(res_state["last_action"], "Alice joined the game.");

    validate_state_num_of_players(state, &game_id, 1);

    // Issue an idempotent request, which should not update the state.

    let res = client
        .post(format!("/game/{}/join", game_id))
        .private_cookie(cookie)
        .json(&JoinRequest {
            name: String::from("Not Alice"),
        })
        .dispatch();
    // No new cookies are added.
    assert_eq!(res.cookies().iter().count(), 0);
    let res_state = expect_valid_action_response(res);
    assert_eq!(res_state["players"][0]["name"], "Alice");

    // Verify that we still have a single player in the state.
    // The reason is that the last request was already authenticated.
    validate_state_num_of_players(state, &game_id, 1);

    // Now, let's have a second client joining the game.

    let res = join_game(&client, &game_id, "Bob");
    let cookie = res.cookies().get_private(SEAT_COOKIE_NAME);
    assert!(cookie.is_some());
    let cookie = cookie.unwrap();
    assert_eq!(cookie.value(), format!("{}/1", game_id));
    assert_eq!(cookie.path(), Some(game_path.as_str()));
    expect_valid_action_response(res);

    validate_state_num_of_players(state, &game_id, 2);
}

#[test]
fn router_join_game_rejected() {
    let client = new_client();
    let game_id = create_game(&client);
    let state = game_state(&client);

    join_players(&client, &game_id, &["Alice"]);

    let res = join_game(&client, &game_id, "Alice");
    assert_eq!(res.cookies().iter().count(), 0);
    expect_invalid_action_response(res, "NameTaken");

    let res = join_game(&client, &game_id, "   ");
    assert_eq!(res.cookies().iter().count(), 0);
    expect_invalid_action_response(res, "InvalidName");

    validate_state_num_of_players(state, &game_id, 1);
}

#[test]
fn router_join_game_too_many_players() {
    let client = new_client();
    let game_id = create_game(&client);
    let state = game_state(&client);

    join_players(&client, &game_id, &["A", "B", "C", "D", "E"]);
    validate_state_num_of_players(state, &game_id, 5);

    // The 6th player to join should fail.
    let res = join_game(&client, &game_id, "F");
    assert_eq!(res.cookies().iter().count(), 0);
    expect_invalid_action_response(res, "LobbyFull");

    validate_state_num_of_players(state, &game_id, 5);
}

#[test]
fn router_join_game_not_found() {
    let client = new_client();
    let res = join_game(&client, &Uuid::new_v4(), "Alice");

    assert_eq!(res.status(), Status::NotFound);
    assert_eq!(res.cookies().iter().count(), 0);
}

#[test]
fn router_start_game() {
    let client = new_client();
    let game_id = create_game(&client);
    let state = game_state(&client);
    let cookies = join_players(&client, &game_id, &["Alice"]);

    expect_invalid_action_response(
        start_game(&client, &game_id, &cookies[0]),
        "NotEnoughPlayers",
    );

    let cookies = [cookies, join_players(&client, &game_id, &["Bob"])].concat();

    // Only the host can start the game.
    expect_invalid_action_response(start_game(&client, &game_id, &cookies[1]), "NotHost");
    validate_state_phase(state, &game_id, GamePhase::InLobby);

    let res_state = expect_valid_action_response(start_game(&client, &game_id, &cookies[0]));
    assert_eq!(res_state["phase"], "playing");
    assert_eq!(res_state["turn"], 0);
    assert_eq!(res_state["action"], json!({"state": "idle"}));
    assert_eq!(res_state["face_up"].as_array().map(Vec::len), Some(5));
    assert_eq!(res_state["players"][0]["hand_size"], 4);
    assert_eq!(res_state["players"][1]["hand_size"], 4);

    validate_state_phase(state, &game_id, GamePhase::Playing);
    validate_state_turn(state, &game_id, Some(0));

    // The game cannot be started twice, nor joined once started.
    expect_invalid_action_response(start_game(&client, &game_id, &cookies[0]), "WrongPhase");
    expect_invalid_action_response(join_game(&client, &game_id, "Carol"), "WrongPhase");
    validate_state_num_of_players(state, &game_id, 2);
}

// Tests for the game state.

#[test]
fn router_get_game_state_unauthenticated() {
    let client = new_client();
    let (game_id, cookies) = new_started_game(&client, &["Alice", "Bob"]);

    let res = client.get(format!("/game/{}/state", game_id)).dispatch();
    assert_eq!(res.status(), Status::Unauthorized);

    // A cookie from another game is useless.
    let other_game_id = create_game(&client);
    let res = get_state(&client, &other_game_id, &cookies[0]);
    assert_eq!(res.status(), Status::Unauthorized);
}

#[test]
fn router_get_game_state_unknown_game() {
    let client = new_client();
    let game_id = Uuid::new_v4();
    let cookie = Cookie::new(
        SEAT_COOKIE_NAME,
        Seat::new(game_id, 0).to_string(),
    );

    let res = get_state(&client, &game_id, &cookie);
    assert_eq!(res.status(), Status::NotFound);
}

#[test]
fn router_get_game_state_only_shows_own_hand() {
    let client = new_client();
    let (game_id, cookies) = new_started_game(&client, &["Alice", "Bob", "Carol"]);

    let res = get_state(&client, &game_id, &cookies[1]);
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.content_type(), Some(ContentType::JSON));

    let res_state = res.into_json::<Value>();
    assert!(res_state.is_some());
    let res_state = res_state.unwrap();

    let players = res_state["players"].as_array();
    assert!(players.is_some());
    let players = players.unwrap();
    assert_eq!(players.len(), 3);

    for (player_id, player) in players.iter().enumerate() {
        assert_eq!(player["id"], player_id);
        assert_eq!(player["hand_size"], 4);
        assert_eq!(player["wagons"], 45);
        assert_eq!(player["score"], 0);
        assert_eq!(player.get("hand").is_some(), player_id == 1);
    }

    let hand = res_state["players"][1]["hand"].as_object();
    assert!(hand.is_some());
    let num_cards: u64 = hand.unwrap().values().filter_map(Value::as_u64).sum();
    assert_eq!(num_cards, 4);

    validate_state_if(game_state(&client), &game_id, |session| {
        assert_eq!(
            res_state["players"][1]["hand"],
            serde_json::to_value(session.players()[1].hand()).unwrap()
        );
    });
}

// Tests for the turns.

#[test]
fn router_draw_cards() {
    let client = new_client();
    let (game_id, cookies) = new_started_game(&client, &["Alice", "Bob"]);
    let state = game_state(&client);

    expect_invalid_action_response(
        draw_card(&client, &game_id, &cookies[1], DrawSlot::Pile),
        "NotYourTurn",
    );

    let res_state =
        expect_valid_action_response(draw_card(&client, &game_id, &cookies[0], DrawSlot::Pile));
    assert_eq!(res_state["turn"], 0);
    assert_eq!(res_state["action"], json!({"state": "drawing", "cards_drawn": 1}));
    assert_eq!(res_state["players"][0]["hand_size"], 5);
    assert_eq!(
        res_state["last_action"],
        "Alice drew a train card from the draw pile."
    );

    // Once a card is drawn, a route cannot be claimed anymore.
    expect_invalid_action_response(
        claim_route(&client, &game_id, &cookies[0], 0, None),
        "ActionInProgress",
    );

    let res_state =
        expect_valid_action_response(draw_card(&client, &game_id, &cookies[0], DrawSlot::Pile));
    assert_eq!(res_state["turn"], 1);
    assert_eq!(res_state["action"], json!({"state": "idle"}));
    assert_eq!(res_state["players"][0]["hand_size"], 6);
    validate_state_turn(state, &game_id, Some(1));

    expect_invalid_action_response(
        draw_card(&client, &game_id, &cookies[1], DrawSlot::FaceUp(7)),
        "InvalidSlot",
    );
    validate_state_turn(state, &game_id, Some(1));
}

#[test]
fn router_claim_route_rejected() {
    let client = new_client();
    let (game_id, cookies) = new_started_game(&client, &["Alice", "Bob"]);

    expect_invalid_action_response(
        claim_route(&client, &game_id, &cookies[0], 999, None),
        "UnknownRoute",
    );
    expect_invalid_action_response(
        claim_route(&client, &game_id, &cookies[1], 0, None),
        "NotYourTurn",
    );
    expect_invalid_action_response(
        claim_route(&client, &game_id, &cookies[0], 0, Some(TrainColor::Wild)),
        "InvalidColor",
    );

    validate_state_if(game_state(&client), &game_id, |session| {
        assert!(session.board().routes().iter().all(|route| route.owner().is_none()));
        assert_eq!(session.current_player(), Some(0));
    });
}

#[test]
fn router_claim_route_between_cities() {
    let client = new_client();
    let (game_id, cookies) = new_started_game(&client, &["Alice", "Bob"]);
    let (from, to) = game_state(&client)
        .get(&game_id)
        .map(|session| {
            let route = &session.board().routes()[0];
            (route.from().to_string(), route.to().to_string())
        })
        .unwrap();

    expect_invalid_action_response(
        claim_route_between(&client, &game_id, &cookies[0], (&from, "Atlantis"), None),
        "UnknownRoute",
    );
    expect_invalid_action_response(
        claim_route_between(&client, &game_id, &cookies[1], (&from, &to), None),
        "NotYourTurn",
    );
    // Cities are matched in either order.
    expect_invalid_action_response(
        claim_route_between(&client, &game_id, &cookies[0], (&to, &from), Some(TrainColor::Wild)),
        "InvalidColor",
    );

    validate_state_turn(game_state(&client), &game_id, Some(0));
}

#[test]
fn router_claim_route() {
    let client = new_client();
    let (game_id, cookies) = new_started_game(&client, &["Alice", "Bob"]);
    let state = game_state(&client);

    for _ in 0..20 {
        let (current, route) = find_claimable_route(state, &game_id);

        let route = match route {
            Some(route) => route,
            None => {
                expect_valid_action_response(draw_card(
                    &client,
                    &game_id,
                    &cookies[current],
                    DrawSlot::Pile,
                ));
                expect_valid_action_response(draw_card(
                    &client,
                    &game_id,
                    &cookies[current],
                    DrawSlot::Pile,
                ));
                continue;
            }
        };

        let length = state
            .get(&game_id)
            .map(|session| session.board().routes()[route].length())
            .unwrap();

        let res_state =
            expect_valid_action_response(claim_route(&client, &game_id, &cookies[current], route, None));
        assert_eq!(res_state["board"]["routes"][route]["owner"], current);
        assert_eq!(
            res_state["players"][current]["wagons"],
            45 - u64::from(length)
        );
        assert_eq!(res_state["players"][current]["score"], route_score(length));
        assert_eq!(res_state["turn"], (current + 1) % 2);

        // A claimed route is claimed for good.
        let next = (current + 1) % 2;
        expect_invalid_action_response(
            claim_route(&client, &game_id, &cookies[next], route, None),
            "RouteTaken",
        );
        return;
    }

    panic!("No route was ever claimable.");
}
