use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use proptest::{collection, prop_assert_eq, proptest};

use crate::{
    container::{
        self, Fixed, Nullable, Polymorphic, Required, Reuse, Utf,
        VarLen,
    },
    BinarySerializer, DataInput, DataOutput, Decoder, Encoder, Error, Object,
    Options, Registry, Result,
};

fn with_encoder(
    registry: &Registry,
    write: impl FnOnce(&mut Encoder<'_>) -> Result<()>,
) -> Vec<u8> {
    let mut buffer = Vec::new();
    write(&mut Encoder::new(&mut buffer, registry)).unwrap();
    buffer
}

fn with_decoder<T>(
    registry: &Registry,
    bytes: &[u8],
    read: impl FnOnce(&mut Decoder<'_>) -> Result<T>,
) -> Result<T> {
    let mut source = bytes;
    read(&mut Decoder::new(&mut source, registry))
}

#[test]
fn array_layout() {
    let mut buffer = Vec::new();
    container::write_array(&mut buffer, Some(&[1_i32, 2][..])).unwrap();
    container::write_array::<i32, _>(&mut buffer, None).unwrap();

    assert_eq!(buffer, [0x00, 0x02, 0, 0, 0, 1, 0, 0, 0, 2, 0x01]);
}

#[test]
fn array_buffer_reused_only_on_same_length() {
    let mut bytes = Vec::new();
    container::write_array(&mut bytes, Some(&[7_i64, 8, 9][..])).unwrap();

    let buffer = vec![0_i64; 3];
    let pointer = buffer.as_ptr();
    let filled = container::read_array(
        &mut bytes.as_slice(),
        false,
        Some(buffer),
        &Options::default(),
    )
    .unwrap()
    .unwrap();

    assert_eq!(filled.reuse, Reuse::Reused);
    assert_eq!(filled.value.as_ptr(), pointer);
    assert_eq!(filled.len(), 3);
    assert_eq!(filled.value, [7, 8, 9]);

    let filled = container::read_array(
        &mut bytes.as_slice(),
        false,
        Some(vec![0_i64; 4]),
        &Options::default(),
    )
    .unwrap()
    .unwrap();

    assert_eq!(filled.reuse, Reuse::Allocated);
    assert_eq!(filled.value, [7, 8, 9]);
}

#[test]
fn empty_array_does_not_allocate() {
    let mut bytes = Vec::new();
    container::write_array::<f32, _>(&mut bytes, Some(&[] as &[f32])).unwrap();

    assert_eq!(bytes, [0x00, 0x00]);

    let filled = container::read_array::<f32, _>(
        &mut bytes.as_slice(),
        false,
        None,
        &Options::default(),
    )
    .unwrap()
    .unwrap();

    assert!(filled.value.is_empty());
    assert_eq!(filled.value.capacity(), 0);
}

#[test]
fn null_array() {
    let bytes = [0x01_u8];

    assert!(container::read_array::<i16, _>(
        &mut bytes.as_slice(),
        true,
        Some(vec![1, 2]),
        &Options::default(),
    )
    .unwrap()
    .is_none());

    assert!(matches!(
        container::read_array::<i16, _>(
            &mut bytes.as_slice(),
            false,
            None,
            &Options::default(),
        ),
        Err(Error::UnexpectedNull)
    ));
}

#[test]
fn byte_array_matches_generic_array() {
    let payload = b"tessera".as_slice();

    let mut bulk = Vec::new();
    container::write_byte_array(&mut bulk, Some(payload)).unwrap();

    let mut generic = Vec::new();
    container::write_array(&mut generic, Some(payload)).unwrap();

    assert_eq!(bulk, generic);

    let buffer = vec![0_u8; payload.len()];
    let filled = container::read_byte_array(
        &mut bulk.as_slice(),
        false,
        Some(buffer),
        &Options::default(),
    )
    .unwrap()
    .unwrap();

    assert!(filled.is_reused());
    assert_eq!(filled.into_value(), payload);
}

#[test]
fn truncated_byte_array() {
    let bytes = [0x00_u8, 0x05, 1, 2];
    let options = Options::builder().preallocation_limit(1).build();

    assert!(matches!(
        container::read_byte_array(&mut bytes.as_slice(), false, None, &options),
        Err(Error::EndOfInput)
    ));
}

#[test]
fn huge_declared_count_fails_without_preallocating() {
    let registry = Registry::new();
    // count = i32::MAX, no elements
    let bytes = [0x00_u8, 0xFF, 0xFF, 0xFF, 0xFF, 0x07];

    let result = with_decoder(&registry, &bytes, |decoder| {
        container::read_list::<i64, _>(decoder, false, None, &Required(Fixed))
    });

    assert!(matches!(result, Err(Error::EndOfInput)));
}

#[test]
fn count_beyond_i32_is_malformed() {
    let bytes = [0xFF_u8, 0xFF, 0xFF, 0xFF, 0x08];

    assert!(matches!(
        container::read_count(&mut bytes.as_slice()),
        Err(Error::MalformedVarInt { kind: "i32" })
    ));
}

#[test]
fn count_overflow() {
    let count = usize::try_from(i32::MAX).unwrap() + 1;

    assert!(matches!(
        container::write_count(&mut Vec::<u8>::new(), count),
        Err(Error::CountOverflow { count: overflow }) if overflow == count
    ));
}

#[test]
fn list_elements_are_value_frames() {
    let registry = Registry::new();
    let list = ["a".to_owned(), "bc".to_owned()];

    let bytes = with_encoder(&registry, |encoder| {
        container::write_list(encoder, Some(list.as_slice()), &Required(Utf))
    });

    assert_eq!(bytes, [0x00, 0x02, 0x00, 0x01, b'a', 0x00, 0x02, b'b', b'c']);
}

#[test]
fn null_element_needs_nullable_codec() {
    let registry = Registry::new();
    let list = [Some(5_i32), None, Some(300)];

    let bytes = with_encoder(&registry, |encoder| {
        container::write_list(encoder, Some(list.as_slice()), &Nullable(VarLen))
    });

    assert_eq!(bytes, [0x00, 0x03, 0x00, 0x05, 0x01, 0x00, 0xAC, 0x02]);

    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_list::<Option<i32>, _>(
            decoder,
            false,
            None,
            &Nullable(VarLen),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.value, list);

    let rejected = with_decoder(&registry, &bytes, |decoder| {
        container::read_list::<i32, _>(decoder, false, None, &Required(VarLen))
    });

    assert!(matches!(rejected, Err(Error::UnexpectedNull)));
}

#[test]
fn list_buffer_reused_only_on_same_length() {
    let registry = Registry::new();
    let bytes = with_encoder(&registry, |encoder| {
        container::write_list(
            encoder,
            Some([1_i32, 2, 3].as_slice()),
            &Required(Fixed),
        )
    });

    let buffer = vec![0_i32; 3];
    let pointer = buffer.as_ptr();
    let same = with_decoder(&registry, &bytes, |decoder| {
        container::read_list(decoder, false, Some(buffer), &Required(Fixed))
    })
    .unwrap()
    .unwrap();

    assert_eq!(same.reuse, Reuse::Reused);
    assert_eq!(same.value.as_ptr(), pointer);
    assert_eq!(same.value, [1, 2, 3]);

    let mismatched = with_decoder(&registry, &bytes, |decoder| {
        container::read_list(
            decoder,
            false,
            Some(vec![0_i32; 7]),
            &Required(Fixed),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(mismatched.reuse, Reuse::Allocated);
    assert_eq!(mismatched.value, [1, 2, 3]);
}

#[test]
fn set_buffer_reused_only_on_same_length() {
    let registry = Registry::new();
    let set = BTreeSet::from([3_i16, 1, 2]);

    let bytes = with_encoder(&registry, |encoder| {
        container::write_collection(encoder, Some(&set), &Required(Fixed))
    });

    let stale = HashSet::from([40_i16, 50, 60]);
    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_collection(
            decoder,
            false,
            Some(stale),
            &Required(Fixed),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.reuse, Reuse::Reused);
    assert_eq!(read.value, HashSet::from([1, 2, 3]));

    let stale = HashSet::from([40_i16, 50, 60, 70]);
    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_collection(
            decoder,
            false,
            Some(stale),
            &Required(Fixed),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.reuse, Reuse::Allocated);
    assert_eq!(read.value, HashSet::from([1, 2, 3]));

    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_collection::<VecDeque<i16>, _>(
            decoder,
            false,
            None,
            &Required(Fixed),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.reuse, Reuse::Allocated);
    assert_eq!(read.value, [1, 2, 3]);
}

#[test]
fn map_buffer_reused_only_on_same_length() {
    let registry = Registry::new();
    let map = BTreeMap::from([(1_i8, 10_i64), (2, 20)]);

    let bytes = with_encoder(&registry, |encoder| {
        container::write_map(
            encoder,
            Some(&map),
            &Required(Fixed),
            &Required(Fixed),
        )
    });

    let read = |buffer: BTreeMap<i8, i64>| {
        with_decoder(&registry, &bytes, |decoder| {
            container::read_map(
                decoder,
                false,
                Some(buffer),
                &Required(Fixed),
                &Required(Fixed),
            )
        })
        .unwrap()
        .unwrap()
    };

    let same = read(BTreeMap::from([(5, 50), (6, 60)]));
    assert_eq!(same.reuse, Reuse::Reused);
    assert_eq!(same.value, map);

    let shorter = read(BTreeMap::from([(5, 50)]));
    assert_eq!(shorter.reuse, Reuse::Allocated);
    assert_eq!(shorter.value, map);
}

#[test]
fn empty_collection_is_not_null() {
    let registry = Registry::new();
    let bytes = [0x00_u8, 0x00];

    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_list::<String, _>(
            decoder,
            true,
            Some(Vec::with_capacity(4)),
            &Required(Utf),
        )
    })
    .unwrap()
    .unwrap();

    assert!(read.is_reused());
    assert!(read.value.is_empty());

    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_list::<String, _>(
            decoder,
            true,
            Some(vec!["stale".to_owned()]),
            &Required(Utf),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.reuse, Reuse::Allocated);
    assert!(read.value.is_empty());
}

#[test]
fn map_with_nullable_keys_and_values() {
    let registry = Registry::new();
    let map = HashMap::from([
        (Some("one".to_owned()), Some(1_i64)),
        (None, Some(0)),
        (Some("none".to_owned()), None),
    ]);

    let bytes = with_encoder(&registry, |encoder| {
        container::write_map(
            encoder,
            Some(&map),
            &Nullable(Utf),
            &Nullable(Fixed),
        )
    });

    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_map::<HashMap<Option<String>, Option<i64>>, _, _>(
            decoder,
            false,
            Some(HashMap::new()),
            &Nullable(Utf),
            &Nullable(Fixed),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.value, map);

    let rejected = with_decoder(&registry, &bytes, |decoder| {
        container::read_map::<HashMap<String, Option<i64>>, _, _>(
            decoder,
            false,
            None,
            &Required(Utf),
            &Nullable(Fixed),
        )
    });

    assert!(matches!(rejected, Err(Error::UnexpectedNull)));
}

#[test]
fn multimap_counts_pairs() {
    let registry = Registry::new();
    let multimap = BTreeMap::from([
        ("a".to_owned(), vec![1_i8, 2]),
        ("b".to_owned(), vec![3]),
    ]);

    let bytes = with_encoder(&registry, |encoder| {
        container::write_multimap(
            encoder,
            Some(&multimap),
            &Required(Utf),
            &Required(Fixed),
        )
    });

    assert_eq!(
        bytes,
        [
            0x00, 0x03, // marker, pair count
            0x00, 0x01, b'a', 0x00, 0x01, 0x00, 0x01, b'a', 0x00, 0x02,
            0x00, 0x01, b'b', 0x00, 0x03,
        ]
    );

    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_multimap::<HashMap<String, Vec<i8>>, _, _>(
            decoder,
            false,
            None,
            &Required(Utf),
            &Required(Fixed),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.value["a"], [1, 2]);
    assert_eq!(read.value["b"], [3]);

    let stale = HashMap::from([("z".to_owned(), vec![9_i8, 9, 9])]);
    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_multimap(
            decoder,
            false,
            Some(stale),
            &Required(Utf),
            &Required(Fixed),
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.reuse, Reuse::Reused);
    assert_eq!(read.value.len(), 2);
    assert!(!read.value.contains_key("z"));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Point {
    x: i32,
    y: i32,
}

struct PointSerializer;

impl BinarySerializer<Point> for PointSerializer {
    fn write(&self, value: &Point, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.write_i32(value.x)?;
        encoder.write_i32(value.y)
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<Box<Point>> {
        Ok(Box::new(Point { x: decoder.read_i32()?, y: decoder.read_i32()? }))
    }
}

fn points() -> Registry {
    let mut registry = Registry::new();
    registry.register::<Point>(PointSerializer);
    registry
}

#[test]
fn object_collection() {
    let registry = points();
    let list = vec![Point { x: 1, y: 2 }, Point { x: -3, y: 4 }];

    let bytes = with_encoder(&registry, |encoder| {
        encoder.write_object_collection(Some(&list))
    });

    assert_eq!(bytes.len(), 2 + 2 * (1 + 8));

    let read = with_decoder(&registry, &bytes, |decoder| {
        decoder.read_object_collection::<BTreeSet<Point>>(false, None)
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.value.into_iter().collect::<Vec<_>>(), [
        Point { x: -3, y: 4 },
        Point { x: 1, y: 2 }
    ]);
}

#[test]
fn object_map() {
    let registry = points();
    let map = BTreeMap::from([
        (Point { x: 0, y: 0 }, Point { x: 1, y: 1 }),
        (Point { x: 2, y: 2 }, Point { x: 3, y: 3 }),
    ]);

    let bytes =
        with_encoder(&registry, |encoder| encoder.write_object_map(Some(&map)));

    let read = with_decoder(&registry, &bytes, |decoder| {
        decoder.read_object_map::<BTreeMap<Point, Point>>(false, None)
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.value, map);
}

#[test]
fn null_object_collection_skips_resolution() {
    let registry = Registry::new();

    let bytes = with_encoder(&registry, |encoder| {
        encoder.write_object_collection::<Vec<Point>>(None)
    });

    assert_eq!(bytes, [0x01]);

    let read = with_decoder(&registry, &bytes, |decoder| {
        decoder.read_object_collection::<Vec<Point>>(true, None)
    })
    .unwrap();

    assert!(read.is_none());

    let unresolved = with_decoder(&registry, &[0x00, 0x00], |decoder| {
        decoder.read_object_collection::<Vec<Point>>(true, None)
    });

    assert!(matches!(unresolved, Err(Error::Registry(_))));
}

trait Animal: Object {
    fn legs(&self) -> i8;
}

#[derive(Debug)]
struct Bird;

#[derive(Debug)]
struct Dog;

impl Animal for Bird {
    fn legs(&self) -> i8 { 2 }
}

impl Animal for Dog {
    fn legs(&self) -> i8 { 4 }
}

struct AnimalSerializer;

impl BinarySerializer<dyn Animal> for AnimalSerializer {
    fn write(&self, value: &dyn Animal, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.write_i8(value.legs())
    }

    fn read(&self, decoder: &mut Decoder<'_>) -> Result<Box<dyn Animal>> {
        Ok(match decoder.read_i8()? {
            2 => Box::new(Bird),
            _ => Box::new(Dog),
        })
    }
}

#[test]
fn polymorphic_elements() {
    let mut registry = Registry::new();
    registry.register_interface::<dyn Animal>(AnimalSerializer);

    let animals: Vec<Box<dyn Animal>> = vec![Box::new(Dog), Box::new(Bird)];
    let element = Required(Polymorphic::<dyn Animal>::resolve(&registry).unwrap());

    let bytes = with_encoder(&registry, |encoder| {
        container::write_list(encoder, Some(animals.as_slice()), &element)
    });

    assert_eq!(bytes, [0x00, 0x02, 0x00, 4, 0x00, 2]);

    let read = with_decoder(&registry, &bytes, |decoder| {
        container::read_list::<Box<dyn Animal>, _>(
            decoder,
            false,
            None,
            &element,
        )
    })
    .unwrap()
    .unwrap();

    assert_eq!(read.value.iter().map(|x| x.legs()).collect::<Vec<_>>(), [4, 2]);
    assert_eq!(Object::type_name(&*read.value[1]), std::any::type_name::<Bird>());
}

proptest! {
    #[test]
    fn i32_array_round_trip(array in collection::vec(proptest::num::i32::ANY, 0..64)) {
        let mut bytes = Vec::new();
        container::write_array(&mut bytes, Some(array.as_slice())).unwrap();

        let read = container::read_array::<i32, _>(
            &mut bytes.as_slice(),
            false,
            None,
            &Options::default(),
        )
        .unwrap()
        .unwrap();

        prop_assert_eq!(read.value, array);
    }

    #[test]
    fn string_list_round_trip(list in collection::vec(".*", 0..16)) {
        let registry = Registry::new();

        let bytes = with_encoder(&registry, |encoder| {
            container::write_list(encoder, Some(list.as_slice()), &Required(Utf))
        });

        let read = with_decoder(&registry, &bytes, |decoder| {
            container::read_list::<String, _>(decoder, false, None, &Required(Utf))
        })
        .unwrap()
        .unwrap();

        prop_assert_eq!(read.value, list);
    }
}

#[test]
fn ordered_collections_ignore_reserve() {
    use container::{Collection, Map};

    let mut set = BTreeSet::from([1_i8]);
    Collection::reserve(&mut set, 1024);
    assert_eq!(Collection::len(&set), 1);

    let mut map = BTreeMap::from([(1_i8, 2_i8)]);
    Map::reserve(&mut map, 1024);
    assert_eq!(Map::len(&map), 1);
}
