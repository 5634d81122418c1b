use crate::model::Model;
use crate::parser::Parser;
use crate::system::SystemKind;
use crate::trainer::{read_conll, Instance, Trainer};

const TRAIN_CONLL: &str = "\
1\tEconomic\t_\tJJ\tJJ\t_\t2\tATT\t_\t_
2\tnews\t_\tNN\tNN\t_\t3\tSBJ\t_\t_
3\thad\t_\tVBD\tVBD\t_\t0\tROOT\t_\t_
4\tlittle\t_\tJJ\tJJ\t_\t5\tATT\t_\t_
5\teffect\t_\tNN\tNN\t_\t3\tOBJ\t_\t_

1\tMarkets\t_\tNNS\tNNS\t_\t2\tSBJ\t_\t_
2\trallied\t_\tVBD\tVBD\t_\t0\tROOT\t_\t_

1\tThe\t_\tDT\tDT\t_\t2\tATT\t_\t_
2\tdollar\t_\tNN\tNN\t_\t3\tSBJ\t_\t_
3\tfell\t_\tVBD\tVBD\t_\t0\tROOT\t_\t_
4\tsharply\t_\tRB\tRB\t_\t3\tADV\t_\t_
";

fn instances() -> Vec<Instance> {
    read_conll(TRAIN_CONLL.as_bytes()).unwrap()
}

fn assert_reproduces_gold(parser: &Parser, instances: &[Instance]) {
    for instance in instances {
        let attachments = parser.parse(instance.sentence()).unwrap();
        assert_eq!(attachments.len(), instance.sentence().len());
        for (i, attachment) in attachments.iter().enumerate() {
            assert_eq!(attachment.head(), instance.heads()[i]);
            assert_eq!(attachment.relation(), instance.relations()[i]);
        }
    }
}

#[test]
fn test_end_to_end_arc_standard() {
    let instances = instances();
    let model = Trainer::new(SystemKind::ArcStandard)
        .iterations(30)
        .unwrap()
        .beam_width(4)
        .unwrap()
        .train(&instances)
        .unwrap();
    let parser = Parser::new(model).unwrap();
    assert_reproduces_gold(&parser, &instances);
}

#[test]
fn test_end_to_end_arc_eager() {
    let instances = instances();
    let model = Trainer::new(SystemKind::ArcEager)
        .iterations(30)
        .unwrap()
        .beam_width(4)
        .unwrap()
        .train(&instances)
        .unwrap();
    let parser = Parser::new(model).unwrap();
    assert_reproduces_gold(&parser, &instances);
}

#[test]
fn test_persisted_model_parses_identically() {
    let instances = instances();
    let model = Trainer::new(SystemKind::ArcEager)
        .iterations(10)
        .unwrap()
        .train(&instances)
        .unwrap();

    let mut buf = vec![];
    model.write(&mut buf).unwrap();
    let restored = Model::read(buf.as_slice()).unwrap();

    let before = Parser::new(model).unwrap();
    let after = Parser::new(restored).unwrap();
    for instance in &instances {
        assert_eq!(
            before.parse(instance.sentence()).unwrap(),
            after.parse(instance.sentence()).unwrap()
        );
    }
}

#[test]
fn test_wider_beam_and_parallel_expansion_still_parse() {
    let instances = instances();
    let model = Trainer::new(SystemKind::ArcStandard)
        .iterations(30)
        .unwrap()
        .train(&instances)
        .unwrap();
    let parser = Parser::new(model)
        .unwrap()
        .beam_width(16)
        .unwrap()
        .parallel(true);
    assert_reproduces_gold(&parser, &instances);
}

#[test]
fn test_unseen_words_are_still_attached() {
    let instances = instances();
    let model = Trainer::new(SystemKind::ArcEager)
        .iterations(10)
        .unwrap()
        .train(&instances)
        .unwrap();
    let parser = Parser::new(model).unwrap();

    let unseen = read_conll(
        "1\tYields\t_\tNNS\tNNS\t_\t2\tSBJ\t_\t_\n2\tclimbed\t_\tVBD\tVBD\t_\t0\tROOT\t_\t_\n"
            .as_bytes(),
    )
    .unwrap();
    let attachments = parser.parse(unseen[0].sentence()).unwrap();
    assert_eq!(attachments.len(), 2);
    for attachment in &attachments {
        assert!(attachment.head() <= 2);
    }
}
