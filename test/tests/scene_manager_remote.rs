/// Scene coordination between a server and a client in another process.
///
/// Drives both loops through an in-memory link and checks the readiness
/// cycle end to end: not-ready suppression, the ready report after a load,
/// and re-spawning of whatever survived the scene change.

use helm_client::{Client, ClientConfig};
use helm_scene::{ImmediateSceneLoader, NetworkSceneManager, Peers, SceneError};
use helm_server::ReadyEvent;
use helm_shared::{AssetId, ErrorKind, SceneMessage, SceneOperation, WorldRefType};
use helm_test::{protocol, ClientServerSetup, Counter, ManualSceneLoader, TestEntity};

fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// A ready client mirroring one server scene object with scene id 7.
/// Returns the object on the server and on the client.
fn ready_with_scene_object(setup: &mut ClientServerSetup) -> (TestEntity, TestEntity) {
    setup.set_client_ready().expect("client should report ready");
    setup.pump();

    let server_entity = setup.server_world.spawn_scene_object(7, false);
    let client_entity = setup.client_world.spawn_scene_object(7, false);
    setup
        .server
        .spawn_object(&mut setup.server_world, &server_entity, None)
        .expect("spawn should succeed");
    setup.pump();

    assert_eq!(setup.client.entities_count(), 1);
    assert!(setup.client_world.is_active(&client_entity));
    (server_entity, client_entity)
}

#[test]
fn ready_report_reaches_server() {
    init_logging();
    let mut setup = ClientServerSetup::new();
    assert!(!setup.server.is_ready(&setup.server_connection));

    setup.set_client_ready().expect("client should report ready");
    let mut events = setup.pump();

    assert!(setup.server.is_ready(&setup.server_connection));
    let readies: Vec<_> = events.read::<ReadyEvent>().collect();
    assert_eq!(readies, vec![setup.server_connection]);
}

#[test]
fn normal_change_runs_the_readiness_cycle() {
    init_logging();
    let mut setup = ClientServerSetup::new();
    let (_, client_entity) = ready_with_scene_object(&mut setup);

    let client_changed = Counter::new();
    setup
        .client_scenes
        .listeners_mut()
        .client_scene_changed
        .add(client_changed.listener());

    setup
        .change_server_scene("level2", SceneOperation::Normal)
        .expect("server should change scene");
    assert!(!setup.server.is_ready(&setup.server_connection));

    let mut events = setup.pump();

    // the client loaded, dropped the old scene and reported ready
    assert_eq!(client_changed.get(), 1);
    assert!(setup.client_scenes.is_ready());
    assert_eq!(setup.client.entities_count(), 0);
    assert!(!setup.client_world.is_active(&client_entity));
    assert!(setup.server.is_ready(&setup.server_connection));
    assert!(events.has::<ReadyEvent>());

    // the surviving scene object is spawned again
    setup.pump();
    assert_eq!(setup.client.entities_count(), 1);
    assert!(setup.client_world.is_active(&client_entity));

    assert_eq!(setup.server_scenes.network_scene_name(), "level2");
    assert_eq!(setup.client_scenes.network_scene_name(), "level2");
}

#[test]
fn normal_change_despawns_entities_left_behind() {
    let mut setup = ClientServerSetup::new();
    let (server_entity, client_entity) = ready_with_scene_object(&mut setup);

    // the old scene is gone from the server's world
    setup.server_world.remove(&server_entity);
    setup
        .change_server_scene("level2", SceneOperation::Normal)
        .expect("server should change scene");
    setup.pump_n(3);

    assert!(!setup.server.is_spawned(&server_entity));
    assert!(setup.server.authority_table().entities().is_empty());
    assert_eq!(setup.client.entities_count(), 0);
    // scene objects on the client are disabled, not destroyed
    assert!(setup.client_world.has_entity(&client_entity));
    assert!(!setup.client_world.is_active(&client_entity));
}

#[test]
fn additive_change_keeps_entities_and_readiness() {
    let mut setup = ClientServerSetup::new();
    ready_with_scene_object(&mut setup);

    setup
        .change_server_scene("overlay", SceneOperation::LoadAdditive)
        .expect("server should change scene");
    assert!(setup.server.is_ready(&setup.server_connection));

    setup.pump_n(2);

    assert!(setup.server.is_ready(&setup.server_connection));
    assert!(setup.client_scenes.is_ready());
    assert_eq!(setup.client.entities_count(), 1);
    assert_eq!(setup.client_scenes.network_scene_name(), "overlay");
}

#[test]
fn spawns_wait_until_client_is_ready() {
    let mut setup = ClientServerSetup::new();
    let asset_id = AssetId::new(3);
    setup.client_world.register_asset(asset_id);
    setup.client.register_prefab(asset_id);

    let server_entity = setup.server_world.spawn_prefab(asset_id, true);
    setup.server_world.set_state(&server_entity, &[1, 2, 3]);
    let entity_id = setup
        .server
        .spawn_object(&mut setup.server_world, &server_entity, None)
        .expect("spawn should succeed");
    setup.pump();

    assert_eq!(setup.client.entities_count(), 0);
    assert!(setup.client_world.is_empty());

    setup.set_client_ready().expect("client should report ready");
    setup.pump_n(2);

    let record = setup
        .client
        .entity(&entity_id)
        .expect("entity should be mirrored");
    let client_entity = record.world_entity.expect("prefab should be instantiated");
    assert_eq!(record.asset_id, Some(asset_id));
    assert!(!record.is_owner);
    assert_eq!(setup.client_world.len(), 1);
    assert_eq!(setup.client_world.state(&client_entity), Some(&[1u8, 2, 3][..]));
}

#[test]
fn unregistered_prefab_is_not_instantiated() {
    let mut setup = ClientServerSetup::new();
    let asset_id = AssetId::new(9);
    setup.client_world.register_asset(asset_id);

    setup.set_client_ready().expect("client should report ready");
    setup.pump();
    let server_entity = setup.server_world.spawn_prefab(asset_id, true);
    setup
        .server
        .spawn_object(&mut setup.server_world, &server_entity, None)
        .expect("spawn should succeed");
    setup.pump();

    assert_eq!(setup.client.entities_count(), 0);
    assert!(setup.client_world.is_empty());
}

#[test]
fn pending_load_holds_back_readiness() {
    let (client_loader, client_loads) = ManualSceneLoader::new();
    let mut setup = ClientServerSetup::with_loaders(ImmediateSceneLoader, client_loader);
    setup.set_client_ready().expect("client should report ready");
    setup.pump();

    let client_changed = Counter::new();
    setup
        .client_scenes
        .listeners_mut()
        .client_scene_changed
        .add(client_changed.listener());

    setup
        .change_server_scene("level2", SceneOperation::Normal)
        .expect("server should change scene");
    setup.pump_n(2);

    assert_eq!(client_loads.pending_names(), vec!["level2".to_string()]);
    assert!(setup.client_scenes.is_loading());
    assert!(!setup.client_scenes.is_ready());
    assert!(!setup.server.is_ready(&setup.server_connection));
    assert_eq!(client_changed.get(), 0);

    client_loads.complete_all();
    setup.pump();

    assert_eq!(client_changed.get(), 1);
    assert!(!setup.client_scenes.is_loading());
    assert!(setup.client_scenes.is_ready());
    assert!(setup.server.is_ready(&setup.server_connection));
}

#[test]
fn abandoned_load_leaves_client_not_ready() {
    let (client_loader, client_loads) = ManualSceneLoader::new();
    let mut setup = ClientServerSetup::with_loaders(ImmediateSceneLoader, client_loader);
    setup.set_client_ready().expect("client should report ready");
    setup.pump();

    setup
        .change_server_scene("level2", SceneOperation::Normal)
        .expect("server should change scene");
    setup.pump();
    assert_eq!(client_loads.pending_count(), 1);

    client_loads.abandon_all();
    setup.pump_n(2);

    assert!(!setup.client_scenes.is_loading());
    assert!(!setup.client_scenes.is_ready());
    assert!(!setup.server.is_ready(&setup.server_connection));
}

#[test]
fn remote_scene_message_defaults_to_own_connection() {
    init_logging();
    let mut setup = ClientServerSetup::new();
    let client_change = Counter::new();
    setup
        .client_scenes
        .listeners_mut()
        .client_change_scene
        .add(client_change.listener());

    let result = setup.client_scenes.client_scene_message(
        Peers::RemoteClient(&mut setup.client),
        None,
        &SceneMessage::new("testScene", SceneOperation::Normal),
    );

    assert!(result.is_ok(), "Expected success, got {:?}", result);
    assert_eq!(setup.client_scenes.network_scene_name(), "testScene");
    assert_eq!(client_change.get(), 1);
}

#[test]
fn remote_scene_message_without_name_fails() {
    let mut setup = ClientServerSetup::new();

    let result = setup.client_scenes.client_scene_message(
        Peers::RemoteClient(&mut setup.client),
        None,
        &SceneMessage::new("", SceneOperation::Normal),
    );

    match result {
        Err(error @ SceneError::MissingArgument { .. }) => {
            assert_eq!(error.to_string(), "scene_name cannot be empty or missing");
            assert_eq!(error.kind(), ErrorKind::InvalidArgument);
        }
        other => panic!("Expected MissingArgument error, got {:?}", other),
    }
    assert_eq!(setup.client_scenes.network_scene_name(), "");
}

#[test]
fn disconnect_clears_readiness() {
    init_logging();
    let mut setup = ClientServerSetup::new();
    setup.set_client_ready().expect("client should report ready");
    setup.pump();
    assert!(setup.client_scenes.is_ready());

    setup.client.disconnect();
    setup.pump();

    assert!(!setup.client.is_active());
    assert!(!setup.client_scenes.is_ready());
}

#[test]
fn scene_message_on_offline_client_fails() {
    let mut manager = NetworkSceneManager::default();
    let mut client: Client<TestEntity> = Client::new(ClientConfig::default(), protocol());
    let client_change = Counter::new();
    manager
        .listeners_mut()
        .client_change_scene
        .add(client_change.listener());

    let result = manager.client_scene_message(
        Peers::RemoteClient(&mut client),
        None,
        &SceneMessage::new("level2", SceneOperation::Normal),
    );

    match result {
        Err(error @ SceneError::ClientNotActive) => {
            assert_eq!(error.kind(), ErrorKind::InvalidOperation);
        }
        other => panic!("Expected ClientNotActive error, got {:?}", other),
    }
    assert_eq!(client_change.get(), 0);
    assert!(!manager.is_loading());
}

#[test]
fn set_client_ready_on_offline_client_fails() {
    let mut manager = NetworkSceneManager::default();
    let mut client: Client<TestEntity> = Client::new(ClientConfig::default(), protocol());

    let result = manager.set_client_ready(Peers::RemoteClient(&mut client));

    assert!(matches!(result, Err(SceneError::ClientNotActive)));
    assert!(!manager.is_ready());
}

#[test]
fn remote_set_client_ready_twice_fails() {
    let mut setup = ClientServerSetup::new();

    setup.set_client_ready().expect("first ready should succeed");
    assert!(matches!(
        setup.set_client_ready(),
        Err(SceneError::AlreadyReady)
    ));

    let mut events = setup.pump();
    assert_eq!(events.read::<ReadyEvent>().count(), 1);
}
