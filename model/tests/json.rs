use pretty_assertions::assert_eq;

fn sample_round() -> model::Round {
    model::Round {
        number: 1,
        winner: Some(model::Side::Ct),
        win_reason: Some(model::WinReason::BombDefused),
        end_t_score: 0,
        end_ct_score: 1,
        snapshots: vec![model::Snapshot {
            tick: 1300,
            time_in_round: 1.25,
            bomb: model::Bomb {
                x: 10.0,
                y: -20.0,
                state: model::BombPhase::Carried,
                carrier: Some(76561198000000001),
            },
            players: vec![model::PlayerState {
                steam_id: 76561198000000001,
                name: "player one".to_owned(),
                team: Some(model::Side::T),
                x: 1.0,
                y: 2.0,
                z: 3.0,
                yaw: 90.0,
                hp: 100,
                armor: 50,
                is_alive: true,
                weapon: "AK-47".to_owned(),
                has_defuser: false,
                flash_alpha: 0.0,
            }],
        }],
        kills: vec![model::KillEvent {
            tick: 1400,
            time_in_round: 2.8125,
            attacker: 76561198000000001,
            victim: 76561198000000002,
            weapon: "AK-47".to_owned(),
            headshot: true,
            wallbang: false,
            attacker_x: 1.0,
            attacker_y: 2.0,
            victim_x: 5.0,
            victim_y: 6.0,
        }],
        grenades: vec![model::GrenadeEvent {
            kind: model::GrenadeType::Smoke,
            thrower: 76561198000000001,
            throw_tick: 1310,
            throw_time: 1.4,
            throw_x: 0.0,
            throw_y: 0.0,
            detonate_tick: 1400,
            detonate_time: 2.8,
            detonate_x: 4.0,
            detonate_y: 4.0,
            effect_duration: Some(18.0),
            trajectory: vec![model::TrajectoryPoint {
                time_in_round: 1.4,
                x: 0.0,
                y: 0.0,
            }],
        }],
    }
}

#[test]
fn match_document_field_names() {
    let m = model::Match {
        id: "abc".to_owned(),
        map: "de_dust2".to_owned(),
        tick_rate: 64.0,
        duration: 1800.0,
        teams: model::Teams::default(),
        rounds: vec![sample_round()],
        map_config: None,
    };

    let value = serde_json::to_value(&m).unwrap();

    assert_eq!(value["tickRate"], serde_json::json!(64.0));
    assert!(value.get("mapConfig").is_none());

    let round = &value["rounds"][0];
    assert_eq!(round["winner"], serde_json::json!("ct"));
    assert_eq!(round["winReason"], serde_json::json!("bomb_defused"));
    assert_eq!(round["endTScore"], serde_json::json!(0));
    assert_eq!(round["endCTScore"], serde_json::json!(1));

    let snapshot = &round["snapshots"][0];
    assert_eq!(snapshot["timeInRound"], serde_json::json!(1.25));
    assert_eq!(snapshot["bomb"]["state"], serde_json::json!("carried"));
    let player = &snapshot["players"][0];
    assert_eq!(player["steamId"], serde_json::json!(76561198000000001u64));
    assert_eq!(player["isAlive"], serde_json::json!(true));
    assert_eq!(player["hasDefuser"], serde_json::json!(false));
    assert_eq!(player["flashAlpha"], serde_json::json!(0.0));

    let kill = &round["kills"][0];
    assert_eq!(kill["attackerX"], serde_json::json!(1.0));
    assert_eq!(kill["victimY"], serde_json::json!(6.0));

    let grenade = &round["grenades"][0];
    assert_eq!(grenade["type"], serde_json::json!("smoke"));
    assert_eq!(grenade["throwTick"], serde_json::json!(1310));
    assert_eq!(grenade["effectDuration"], serde_json::json!(18.0));
    assert_eq!(grenade["trajectory"][0]["t"], serde_json::json!(1.4));
}

#[test]
fn optional_fields_are_omitted() {
    let round = model::Round {
        number: 3,
        winner: None,
        win_reason: None,
        end_t_score: 1,
        end_ct_score: 1,
        snapshots: Vec::new(),
        kills: Vec::new(),
        grenades: vec![model::GrenadeEvent {
            kind: model::GrenadeType::Flash,
            thrower: 0,
            throw_tick: 10,
            throw_time: 0.1,
            throw_x: 0.0,
            throw_y: 0.0,
            detonate_tick: 0,
            detonate_time: 0.0,
            detonate_x: 0.0,
            detonate_y: 0.0,
            effect_duration: None,
            trajectory: Vec::new(),
        }],
    };

    let value = serde_json::to_value(&round).unwrap();
    assert!(value.get("winner").is_none());
    assert!(value.get("winReason").is_none());

    let grenade = &value["grenades"][0];
    assert!(grenade.get("effectDuration").is_none());
    assert!(grenade.get("trajectory").is_none());

    let bomb = model::Bomb {
        x: 0.0,
        y: 0.0,
        state: model::BombPhase::Dropped,
        carrier: None,
    };
    let value = serde_json::to_value(&bomb).unwrap();
    assert!(value.get("carrier").is_none());
}

#[test]
fn map_config_defaults_missing_fields() {
    let cfg: model::MapConfig = serde_json::from_str(
        r#"{"name":"de_test","displayName":"Test","posX":-100.5,"posY":200.0,"scale":4.4,"radarFile":"de_test.png"}"#,
    )
    .unwrap();

    assert_eq!(cfg.name, "de_test");
    assert_eq!(cfg.display_name, "Test");
    assert_eq!(cfg.pos_x, -100.5);
    assert_eq!(cfg.radar_width, 0);
    assert_eq!(cfg.lower_radar_file, None);
}
